// ABOUTME: Version, welcome banner, and environment-derived configuration

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "Welcome to Umbra REPL!";
pub const WELCOME_FOOTER: &str = "Enter :q to exit.";

/// Usage-error exit code, matching the Unix `EX_USAGE` convention referenced
/// by spec section 6.
pub const EXIT_USAGE: i32 = 64;

/// The root directory modules are resolved under (`$UMBRA_PATH/lib/<name>.u`).
/// Empty when unset, which resolves relative to the process's working directory.
pub fn umbra_path() -> String {
    std::env::var("UMBRA_PATH").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
