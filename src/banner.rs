use larabox::{paint, CYAN_BOLD, GREY};

/// True when the banner should be skipped (`-q` or `LARABOX_NO_BANNER`).
pub(crate) fn banner_suppressed(quiet: bool) -> bool {
    quiet
        || std::env::var("LARABOX_NO_BANNER")
            .map(|v| !v.trim().is_empty() && v.trim() != "0")
            .unwrap_or(false)
}

pub(crate) fn print_startup_banner(config: &larabox::Config) {
    let use_err = larabox::color_enabled_stderr();
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "{}",
        paint(use_err, CYAN_BOLD, &format!("larabox v{version}  -  Laravel dev containers"))
    );
    eprintln!(
        "{}",
        paint(
            use_err,
            GREY,
            &format!(
                "  project {}  |  container {}  |  port {}",
                config.project_name(),
                config.container(),
                config.server_port()
            )
        )
    );
    eprintln!();
}
