use std::process::Command;

/// Trimmed stdout of a command, or "unknown" if it fails.
fn command_stdout(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let commit_sha = command_stdout("git", &["rev-parse", "--short", "HEAD"]);
    let build_date = command_stdout("date", &["+%Y-%m-%d"]);

    // "rustc 1.92.0 (...)" -> "1.92.0"
    let rustc_version = command_stdout("rustc", &["--version"])
        .strip_prefix("rustc ")
        .and_then(|v| v.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string();

    println!("cargo:rustc-env=CODEDNA_COMMIT_SHA={}", commit_sha);
    println!("cargo:rustc-env=CODEDNA_BUILD_DATE={}", build_date);
    println!("cargo:rustc-env=CODEDNA_RUSTC_VERSION={}", rustc_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
}
