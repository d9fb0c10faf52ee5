//! Canonical default values for a Dark & Light dedicated server.

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7777;
pub const DEFAULT_QUERY_PORT: u16 = 27016;
pub const DEFAULT_MAP: &str = "DNL_ALL";
pub const DEFAULT_MAX_PLAYERS: u32 = 70;

/// Remote location of the stock `GameUserSettings.ini` template.
pub const CONFIG_TEMPLATE_URL: &str =
    "https://raw.githubusercontent.com/1stian/WindowsGSM-Configs/master/DarkAndLight/GameUserSettings.ini";
