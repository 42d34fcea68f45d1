use nerdfont_detect::{Context, InstallStatus};
use std::time::Duration;

fn main() {
    let cx = Context::with_timeout(Duration::from_secs(5));

    let status = nerdfont_detect::detect(&cx).unwrap_or_else(|e| {
        eprintln!("some detectors failed:\n{e}");
        InstallStatus::NotInstalled
    });

    match status {
        InstallStatus::Enabled => {
            println!("status: nerd fonts were explicitly enabled by the user")
        }
        InstallStatus::Installed => println!("status: nerd fonts are installed on the system"),
        InstallStatus::Disabled | InstallStatus::NotInstalled => {
            println!("status: nerd fonts are not installed or were explicitly disabled")
        }
    }
}
