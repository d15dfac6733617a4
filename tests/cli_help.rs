use std::process::Command;

#[test]
fn help_lists_every_subcommand() {
    let bin = env!("CARGO_BIN_EXE_accdev");

    let output = Command::new(bin).arg("--help").output().unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "deploy",
        "diff",
        "export",
        "load",
        "analyze-usage",
        "benchmark",
        "prepare-release",
        "search",
    ] {
        assert!(
            stdout.contains(name),
            "help output should list `{}`; got:\n{}",
            name,
            stdout
        );
    }
    assert!(
        stdout.contains("Run 'accdev' without arguments for the interactive menu."),
        "help output should mention the interactive menu; got:\n{}",
        stdout
    );
}

#[test]
fn version_prints_the_package_version() {
    let bin = env!("CARGO_BIN_EXE_accdev");

    let output = Command::new(bin).arg("--version").output().unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "version output should carry the package version; got:\n{}",
        stdout
    );
}
