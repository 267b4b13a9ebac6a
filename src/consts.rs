// Units reserved by the host for its own use, never bound to a node
pub const RESERVED_UNITS: &[&str] = &[
    "PassageDone",
    "PassageFooter",
    "PassageHeader",
    "PassageReady",
    "Start",
    "StoryAuthor",
    "StoryBanner",
    "StoryCaption",
    "StoryDisplayTitle",
    "StoryInit",
    "StoryInterface",
    "StoryMenu",
    "StorySettings",
    "StoryShare",
    "StorySubtitle",
    "StoryTitle",
];

// Special units
pub const HISTORY_UNIT: &str = "History";

// Text markers
pub const SCENE_BREAK: &str = "****";
pub const SUB_OPEN: char = '{';
pub const SUB_CLOSE: char = '}';
pub const DETAIL_SEPARATOR: char = '|';
pub const DESCRIPTION_MARKER: char = '?';
pub const ELLIPSIS: char = '\u{2026}';
pub const EXCERPT_WORDS: usize = 8;

// Render regions
pub const MAIN_REGION: &str = "passages";
pub const BODY_SUFFIX: &str = "-body";
pub const ACTIONS_SUFFIX: &str = "-actions";
pub const NEXT_SUFFIX: &str = "-next";
pub const EXAMINE_INFIX: &str = "-examine-";
pub const DOM_ID_PREFIX: &str = "passage-";

// Menu placement
pub const MENU_UNIT: &str = "StoryMenu";
pub const MENU_REGION: &str = "menu";

// Session metadata keys
pub const PATH_KEY: &str = "path";
pub const POINTER_KEY: &str = "pointer";
pub const AUTOSTART_KEY: &str = "autoStart";

// Labels of built-in actions
pub const RETURN_TO_STORY: &str = "return to story";
pub const MENU_BEGIN: &str = "begin";
pub const MENU_RESUME: &str = "resume";
pub const MENU_RESTART: &str = "restart";
pub const MENU_LOAD: &str = "load";
pub const MENU_SAVE: &str = "save";
