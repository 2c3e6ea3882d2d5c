#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! End-to-end bootstrap runs against a simulated host.
//!
//! Each test drives [`bootstrap`](devprep::commands::bootstrap::bootstrap)
//! with a fake executor, downloader and logger, and checks the commands
//! issued, the files written and the task results recorded.

mod common;

use common::*;
use devprep::config::packages::PackageSet;
use devprep::config::{DEFAULT_HOMEBREW_INSTALL_URL, Settings};
use devprep::error::BootstrapError;
use devprep::logging::TaskStatus;
use devprep::platform::PlatformFamily;
use devprep::resources::profile_block::{BEGIN_MARKER, END_MARKER};

fn marker_count(content: &str) -> usize {
    content.lines().filter(|l| l.trim() == BEGIN_MARKER).count()
}

// ---------------------------------------------------------------------------
// Linux
// ---------------------------------------------------------------------------

#[test]
fn ubuntu_end_to_end() {
    let h = Harness::ubuntu();
    h.run().expect("bootstrap succeeds");

    let set = PackageSet::resolve(PlatformFamily::Linux, &[]);
    let install = format!("sudo apt-get install -y {}", set.names().join(" "));
    let calls = h.executor.calls();
    assert!(calls.contains(&"sudo apt-get update".to_string()));
    assert_eq!(calls.iter().filter(|c| **c == install).count(), 1);

    let profile = std::fs::read_to_string(h.bashrc()).expect("profile written");
    assert_eq!(marker_count(&profile), 1);
    assert!(profile.contains(END_MARKER));
    assert!(h.home().join(".nvm").join("nvm.sh").is_file());

    assert!(h.log.warnings().is_empty(), "{:?}", h.log.warnings());
    assert_eq!(h.log.status_of("Verify tools"), Some(TaskStatus::Ok));
    assert_eq!(h.log.status_of("Next steps"), Some(TaskStatus::Ok));
    assert!(
        h.log
            .tasks()
            .iter()
            .all(|(_, s)| matches!(s, TaskStatus::Ok | TaskStatus::NotApplicable))
    );
}

#[test]
fn ubuntu_refreshes_before_installing() {
    let h = Harness::ubuntu();
    h.run().unwrap();

    let calls = h.executor.calls();
    let refresh = calls.iter().position(|c| c == "sudo apt-get update").unwrap();
    let install = calls
        .iter()
        .position(|c| c.starts_with("sudo apt-get install"))
        .unwrap();
    assert!(refresh < install);
}

#[test]
fn extra_packages_are_appended() {
    let mut h = Harness::ubuntu();
    h.settings.extra_packages = vec!["jq".to_string(), "git".to_string()];
    h.run().unwrap();

    let install = h
        .executor
        .calls()
        .into_iter()
        .find(|c| c.starts_with("sudo apt-get install"))
        .unwrap();
    assert!(install.ends_with(" liblzma-dev jq"));
    assert_eq!(install.matches(" git").count(), 1);
}

#[test]
fn nvm_installer_is_downloaded_from_the_pinned_release() {
    let h = Harness::ubuntu();
    h.run().unwrap();

    assert_eq!(h.downloader.urls(), vec![Settings::default().nvm_installer_url()]);
    assert!(
        h.executor
            .env()
            .iter()
            .any(|(k, v)| k == "NVM_DIR" && v.ends_with(".nvm"))
    );
}

#[test]
fn other_distribution_warns_and_proceeds() {
    let h = Harness::new(
        FakeExecutor::linux(),
        Some("ID=arch\nPRETTY_NAME=\"Arch Linux\"\n"),
    );
    h.run().expect("unsupported distributions still run");

    let warnings = h.log.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Arch Linux"));
    assert!(
        h.executor
            .calls()
            .iter()
            .any(|c| c.starts_with("sudo apt-get install"))
    );
}

#[test]
fn missing_os_release_aborts() {
    let h = Harness::new(FakeExecutor::linux(), None);
    let err = h.run().unwrap_err();

    assert!(matches!(
        BootstrapError::find(&err),
        Some(BootstrapError::MissingOsDescriptor { .. })
    ));
    assert!(h.log.tasks().is_empty());
}

#[test]
fn unknown_kernel_aborts_before_package_operations() {
    let h = Harness::new(
        FakeExecutor::new("SunOS", &["apt-get", "sudo"]),
        Some(UBUNTU_OS_RELEASE),
    );
    let err = h.run().unwrap_err();

    assert!(matches!(
        BootstrapError::find(&err),
        Some(BootstrapError::UnsupportedPlatform { .. })
    ));
    assert_eq!(h.executor.calls(), vec!["uname -s".to_string()]);
    assert!(h.downloader.urls().is_empty());
    assert!(h.log.tasks().is_empty());
}

#[test]
fn install_failure_stops_the_run() {
    let h = Harness::new(
        FakeExecutor::linux().failing("sudo apt-get install"),
        Some(UBUNTU_OS_RELEASE),
    );
    let err = h.run().unwrap_err();

    assert!(matches!(
        BootstrapError::find(&err),
        Some(BootstrapError::InstallFailed { .. })
    ));
    assert_eq!(h.log.status_of("Install packages"), Some(TaskStatus::Failed));
    assert_eq!(h.log.status_of("Verify tools"), None);
    assert_eq!(h.log.status_of("Next steps"), None);
    assert!(h.downloader.urls().is_empty());
    assert!(!h.bashrc().exists());
    assert_eq!(h.log.errors().len(), 1);
}

#[test]
fn refresh_failure_skips_install() {
    let h = Harness::new(
        FakeExecutor::linux().failing("sudo apt-get update"),
        Some(UBUNTU_OS_RELEASE),
    );
    let err = h.run().unwrap_err();

    assert!(matches!(
        BootstrapError::find(&err),
        Some(BootstrapError::RefreshFailed { .. })
    ));
    assert!(
        !h.executor
            .calls()
            .iter()
            .any(|c| c.starts_with("sudo apt-get install"))
    );
}

#[test]
fn install_that_cannot_start_is_an_install_failure() {
    let h = Harness::new(
        FakeExecutor::linux().unspawnable("sudo apt-get install"),
        Some(UBUNTU_OS_RELEASE),
    );
    let err = h.run().unwrap_err();

    assert!(matches!(
        BootstrapError::find(&err),
        Some(BootstrapError::InstallFailed { .. })
    ));
    assert_eq!(h.log.status_of("Verify tools"), None);
}

#[test]
fn denied_sudo_aborts_before_packages() {
    let h = Harness::new(
        FakeExecutor::linux()
            .failing("sudo -n true")
            .failing("sudo -v"),
        Some(UBUNTU_OS_RELEASE),
    );
    let err = h.run().unwrap_err();

    assert!(matches!(
        BootstrapError::find(&err),
        Some(BootstrapError::PrivilegeDenied { .. })
    ));
    assert!(!h.executor.calls().iter().any(|c| c.contains("apt-get")));
}

// ---------------------------------------------------------------------------
// Shell profile
// ---------------------------------------------------------------------------

#[test]
fn second_run_leaves_one_block() {
    let h = Harness::ubuntu();
    std::fs::write(h.bashrc(), "alias ll='ls -l'\n").unwrap();

    h.run().unwrap();
    let first = std::fs::read_to_string(h.bashrc()).unwrap();
    h.run().unwrap();
    let second = std::fs::read_to_string(h.bashrc()).unwrap();

    assert_eq!(first, second);
    assert_eq!(marker_count(&second), 1);
    assert!(second.starts_with("alias ll='ls -l'\n"));
}

#[test]
#[cfg(unix)]
fn symlinked_profile_keeps_its_link() {
    let h = Harness::ubuntu();
    let real = h.home().join("dotfiles-bashrc");
    std::fs::write(
        &real,
        format!("# shared\n{BEGIN_MARKER}\nexport NVM_DIR=/old\n{END_MARKER}\n"),
    )
    .unwrap();
    std::os::unix::fs::symlink(&real, h.bashrc()).unwrap();

    h.run().unwrap();

    let meta = std::fs::symlink_metadata(h.bashrc()).unwrap();
    assert!(meta.file_type().is_symlink());
    let content = std::fs::read_to_string(&real).unwrap();
    assert!(content.starts_with("# shared\n"));
    assert!(!content.contains("/old"));
    assert_eq!(marker_count(&content), 1);
}

#[test]
fn non_utf8_profile_does_not_abort_the_run() {
    let h = Harness::ubuntu();
    std::fs::write(h.bashrc(), b"# caf\xe9\n").unwrap();

    h.run().expect("bootstrap succeeds");

    let content = std::fs::read(h.bashrc()).unwrap();
    assert!(content.starts_with(b"# caf\xe9\n"));
    assert_eq!(h.log.status_of("Next steps"), Some(TaskStatus::Ok));
}

#[test]
fn zsh_users_get_zshrc() {
    let mut h = Harness::ubuntu();
    h.shell = Some("/usr/bin/zsh".to_string());
    h.run().unwrap();

    assert!(h.home().join(".zshrc").is_file());
    assert!(!h.bashrc().exists());
}

#[test]
fn unknown_shell_falls_back_to_profile_with_warning() {
    let mut h = Harness::ubuntu();
    h.shell = Some("/bin/tcsh".to_string());
    h.run().unwrap();

    assert!(h.home().join(".profile").is_file());
    assert!(h.log.warnings().iter().any(|w| w.contains("tcsh")));
}

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

#[test]
fn darwin_never_invokes_sudo() {
    let h = Harness::macos();
    h.run().expect("bootstrap succeeds");

    assert!(!h.executor.calls().iter().any(|c| c.starts_with("sudo")));
    assert_eq!(
        h.log.status_of("Check privileges"),
        Some(TaskStatus::NotApplicable)
    );
}

#[test]
fn homebrew_is_bootstrapped_once_before_brew_install() {
    let h = Harness::macos();
    h.run().unwrap();

    let calls = h.executor.calls();
    let first_install = calls
        .iter()
        .position(|c| c.starts_with("brew install"))
        .expect("brew install issued");
    let installers_before = calls
        .iter()
        .take(first_install)
        .filter(|c| c.starts_with("bash "))
        .count();
    assert_eq!(installers_before, 1);

    let urls = h.downloader.urls();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0], DEFAULT_HOMEBREW_INSTALL_URL);
    assert_eq!(urls[1], Settings::default().nvm_installer_url());
    assert!(
        h.executor
            .env()
            .contains(&("HOMEBREW_PREFIX".to_string(), "/opt/homebrew".to_string()))
    );
}

#[test]
fn existing_homebrew_is_not_reinstalled() {
    let h = Harness::new(FakeExecutor::new("Darwin", &["brew"]), None);
    h.run().unwrap();

    assert_eq!(h.downloader.urls(), vec![Settings::default().nvm_installer_url()]);
    let set = PackageSet::resolve(PlatformFamily::MacOs, &[]);
    let install = format!("brew install {}", set.names().join(" "));
    assert!(h.executor.calls().contains(&install));
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_changes_nothing() {
    let h = Harness::ubuntu();
    let mut session = h.session();
    session.dry_run = true;
    devprep::commands::bootstrap::bootstrap(session).unwrap();

    assert!(!h.executor.calls().iter().any(|c| c.contains("apt-get")));
    assert!(h.downloader.urls().is_empty());
    assert!(!h.bashrc().exists());
    assert_eq!(h.log.status_of("Install packages"), Some(TaskStatus::DryRun));
    assert_eq!(h.log.status_of("Install nvm"), Some(TaskStatus::DryRun));
}
