const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

macro_rules! env_or {
    ($key:literal, $default:literal) => {
        option_env!($key).unwrap_or($default)
    };
}

/// Build metadata stamped in by `build.rs`.
pub struct BuildInfo {
    pub version: &'static str,
    pub build_time: &'static str,
    pub branch: &'static str,
    pub commit_short: &'static str,
    pub dirty: bool,
    pub profile: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build_time: env_or!("BUILD_TIME_HUMAN", "unknown"),
            branch: env_or!("GIT_BRANCH", "unknown"),
            commit_short: env_or!("GIT_COMMIT_SHORT", "unknown"),
            dirty: matches!(option_env!("GIT_DIRTY"), Some("true")),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

impl BuildInfo {
    pub fn commit_label(&self) -> String {
        if self.dirty {
            format!("{}-dirty", self.commit_short)
        } else {
            self.commit_short.to_owned()
        }
    }
}

pub fn print_banner(info: &BuildInfo, llm_enabled: bool) {
    crate::log_println!();
    crate::log_println!("{MAGENTA}     _       _        _ _       _    {RESET}");
    crate::log_println!("{MAGENTA}    (_)_   _| | _____| (_)_ __ | | __{RESET}");
    crate::log_println!("{MAGENTA}    | | | | | |/ / _ \\ | | '_ \\| |/ /{RESET}");
    crate::log_println!("{MAGENTA}    | | |_| |   <  __/ | | | | |   < {RESET}");
    crate::log_println!("{MAGENTA}   _/ |\\__,_|_|\\_\\___|_|_|_| |_|_|\\_\\{RESET}");
    crate::log_println!("{MAGENTA}  |__/{RESET}");
    crate::log_println!("{DIM}  ------------------------------------{RESET}");

    row("Version", info.version, CYAN);
    row("Built", info.build_time, RESET);
    row("Branch", info.branch, RESET);
    let commit = info.commit_label();
    row("Commit", &commit, if info.dirty { YELLOW } else { RESET });
    row("Profile", info.profile, YELLOW);
    row("Suggestions", if llm_enabled { "chat backend" } else { "off" }, RESET);
    crate::log_println!();
}

fn row(label: &str, value: &str, color: &str) {
    crate::log_println!("  {BOLD}{label:<12}{RESET}{color}{value}{RESET}");
}
