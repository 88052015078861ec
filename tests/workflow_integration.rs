//! Integration tests for the release workflows.
//!
//! These tests build a real product tree in a temp directory:
//!
//! ```text
//! meta.git                      shared meta repository
//! svc-a.git, svc-b.git          services, each embedding meta at openslides-meta
//! root.git                      the product, embedding svc-a and svc-b
//! op/                           the operator's clone of root.git (submodules initialized)
//! ```
//!
//! Every upstream is a bare repository with a `*-work` clone used to
//! produce new commits.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use subrel::core::config::Config;
use subrel::core::types::{BranchName, Oid, Version};
use subrel::core::verify::VerifyError;
use subrel::engine::{self, consistency, AbortReason, Context, Mode, Outcome, Session, WorkflowError};
use subrel::git::Git;
use subrel::ui::prompts::{Answer, DefaultPrompter, Prompter, ScriptedPrompter};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Run a git command in the given directory, panicking on failure.
fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "protocol.file.allow=always"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed in {}: {}",
            args,
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A product tree with upstreams and an operator clone.
struct Product {
    dir: TempDir,
}

impl Product {
    /// Build the tree. Both services embed the first meta commit; the root
    /// records `VERSION` 4.2.7 on `main`.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let product = Self { dir };

        product.upstream("meta");
        product.commit_upstream("meta", "schema.yml", "v: 1\n", "Meta 1");

        for svc in ["svc-a", "svc-b"] {
            product.upstream(svc);
            let work = product.work(svc);
            let meta_url = product.bare("meta");
            run_git(&work, &["submodule", "add", meta_url.to_str().unwrap(), "openslides-meta"]);
            run_git(&work, &["commit", "-m", "Add meta"]);
            run_git(&work, &["push", "--quiet", "origin", "main"]);
        }

        product.upstream("root");
        let work = product.work("root");
        for svc in ["svc-a", "svc-b"] {
            let url = product.bare(svc);
            run_git(&work, &["submodule", "add", url.to_str().unwrap(), svc]);
        }
        std::fs::write(work.join("VERSION"), "4.2.7\n").unwrap();
        run_git(&work, &["add", "VERSION"]);
        run_git(&work, &["commit", "-m", "Add services"]);
        run_git(&work, &["push", "--quiet", "origin", "main"]);

        product.clone_operator();
        product
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn bare(&self, name: &str) -> PathBuf {
        self.path().join(format!("{}.git", name))
    }

    fn work(&self, name: &str) -> PathBuf {
        self.path().join(format!("{}-work", name))
    }

    fn op(&self) -> PathBuf {
        self.path().join("op")
    }

    /// Create `<name>.git` and a `<name>-work` clone with one commit on main.
    fn upstream(&self, name: &str) {
        let bare = self.bare(name);
        let work = self.work(name);
        run_git(self.path(), &["init", "--quiet", "--bare", "-b", "main", bare.to_str().unwrap()]);
        run_git(self.path(), &["init", "--quiet", "-b", "main", work.to_str().unwrap()]);
        configure_identity(&work);
        std::fs::write(work.join("README.md"), format!("# {}\n", name)).unwrap();
        run_git(&work, &["add", "README.md"]);
        run_git(&work, &["commit", "-m", "Initial commit"]);
        run_git(&work, &["remote", "add", "origin", bare.to_str().unwrap()]);
        run_git(&work, &["push", "--quiet", "-u", "origin", "main"]);
    }

    fn clone_operator(&self) {
        let op = self.op();
        run_git(self.path(), &["clone", "--quiet", self.bare("root").to_str().unwrap(), op.to_str().unwrap()]);
        run_git(&op, &["submodule", "update", "--init", "--quiet"]);
        configure_identity(&op);
        for svc in ["svc-a", "svc-b"] {
            configure_identity(&op.join(svc));
        }
    }

    /// Commit a file in `<name>-work` and push the current branch.
    fn commit_upstream(&self, name: &str, file: &str, content: &str, message: &str) -> String {
        let work = self.work(name);
        std::fs::write(work.join(file), content).unwrap();
        run_git(&work, &["add", file]);
        run_git(&work, &["commit", "-m", message]);
        run_git(&work, &["push", "--quiet", "origin", "HEAD"]);
        run_git(&work, &["rev-parse", "HEAD"])
    }

    /// Move the meta submodule of a service upstream to the tip of meta.git.
    fn bump_service_meta(&self, svc: &str) -> String {
        let work = self.work(svc);
        let meta = work.join("openslides-meta");
        run_git(&meta, &["pull", "--quiet", "origin", "main"]);
        run_git(&work, &["add", "openslides-meta"]);
        run_git(&work, &["commit", "-m", "Bump meta"]);
        run_git(&work, &["push", "--quiet", "origin", "HEAD"]);
        run_git(&work, &["rev-parse", "HEAD"])
    }

    /// Create a branch in `<name>-work` at HEAD and push it.
    fn push_branch(&self, name: &str, branch: &str) {
        let work = self.work(name);
        run_git(&work, &["branch", "-f", branch]);
        run_git(&work, &["push", "--quiet", "origin", branch]);
    }

    /// Branches present in `<name>.git`.
    fn remote_heads(&self, name: &str) -> String {
        run_git(self.path(), &["ls-remote", "--heads", self.bare(name).to_str().unwrap()])
    }

    /// Commit `staging/<version>` in root-work on top of main, moving the
    /// given submodules to the given commits, and push it.
    fn publish_staging(&self, version: &str, pointers: &[(&str, &str)]) {
        let root = self.work("root");
        let branch = format!("staging/{}", version);
        run_git(&root, &["checkout", "--quiet", "-B", &branch, "main"]);
        for &(svc, commit) in pointers {
            let sub = root.join(svc);
            run_git(&sub, &["fetch", "--quiet", "origin"]);
            run_git(&sub, &["checkout", "--quiet", "--detach", commit]);
            run_git(&root, &["add", svc]);
        }
        std::fs::write(root.join("VERSION"), format!("{}\n", version)).unwrap();
        run_git(&root, &["add", "VERSION"]);
        run_git(&root, &["commit", "-m", &format!("Staging {}", version)]);
        run_git(&root, &["push", "--quiet", "origin", &branch]);
        run_git(&root, &["checkout", "--quiet", "main"]);
    }

    fn op_git(&self) -> Git {
        Git::open(&self.op()).expect("failed to open operator clone")
    }

    fn op_head(&self) -> String {
        run_git(&self.op(), &["rev-parse", "HEAD"])
    }

    fn op_commit_count(&self) -> String {
        run_git(&self.op(), &["rev-list", "--count", "HEAD"])
    }

    /// Run a workflow in the operator clone.
    fn run(
        &self,
        mode: Mode,
        prompter: &mut dyn Prompter,
        local: bool,
    ) -> Result<Outcome, WorkflowError> {
        let ctx = Context {
            cwd: Some(self.op()),
            quiet: true,
            local,
            ..Default::default()
        };
        let mut session = Session::new(self.op_git(), ctx, Config::default(), prompter)?;
        engine::run(mode, &mut session)
    }
}

fn oid(s: &str) -> Oid {
    Oid::new(s).unwrap()
}

fn completed(outcome: Outcome) -> engine::Summary {
    match outcome {
        Outcome::Completed(summary) => summary,
        Outcome::Aborted(reason) => panic!("unexpected abort: {}", reason),
    }
}

// =============================================================================
// Consistency
// =============================================================================

#[test]
fn consistent_meta_passes() {
    let product = Product::new();
    let git = product.op_git();
    let submodules = git.submodules().unwrap();

    let result =
        consistency::check_tree(&git, &submodules, Path::new("openslides-meta"), None).unwrap();
    assert_eq!(result.checked, 2);
    assert!(result.meta.is_some());
}

#[test]
fn diverging_meta_fails_listing_both_ids() {
    let product = Product::new();
    let m1 = run_git(&product.work("svc-a").join("openslides-meta"), &["rev-parse", "HEAD"]);
    let m2 = product.commit_upstream("meta", "schema.yml", "v: 2\n", "Meta 2");
    let b2 = product.bump_service_meta("svc-b");

    let svc_b = product.op().join("svc-b");
    run_git(&svc_b, &["fetch", "--quiet", "origin"]);
    run_git(&svc_b, &["checkout", "--quiet", "--detach", &b2]);

    let git = product.op_git();
    let submodules = git.submodules().unwrap();
    let err = consistency::check_tree(&git, &submodules, Path::new("openslides-meta"), None)
        .unwrap_err();

    match err {
        WorkflowError::Consistency(VerifyError::MetaMismatch {
            observations,
            distinct,
        }) => {
            let rendered: Vec<String> = observations.iter().map(ToString::to_string).collect();
            assert_eq!(
                rendered,
                vec![format!("svc-a:{}", m1), format!("svc-b:{}", m2)]
            );
            assert_eq!(distinct.len(), 2);
            assert!(distinct.contains(&oid(&m1)));
            assert!(distinct.contains(&oid(&m2)));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The recorded root revision is still consistent.
    let head = git.head_oid().unwrap();
    assert!(
        consistency::check_tree(&git, &submodules, Path::new("openslides-meta"), Some(&head))
            .is_ok()
    );
}

#[test]
fn submodules_are_listed_by_path() {
    let product = Product::new();
    let work = product.path().join("ordered");
    run_git(product.path(), &["init", "--quiet", "-b", "main", work.to_str().unwrap()]);
    configure_identity(&work);
    for (svc, path) in [("svc-b", "zz"), ("svc-a", "aa")] {
        let url = product.bare(svc);
        run_git(&work, &["submodule", "add", url.to_str().unwrap(), path]);
    }
    run_git(&work, &["commit", "-m", "Add services"]);

    let submodules = Git::open(&work).unwrap().submodules().unwrap();
    let paths: Vec<String> = submodules.iter().map(|sm| sm.display_path()).collect();
    assert_eq!(paths, vec!["aa", "zz"]);
}

// =============================================================================
// fetch-all-changes
// =============================================================================

#[test]
fn fetch_all_changes_detaches_at_upstream_tips() {
    let product = Product::new();
    let b2 = product.commit_upstream("svc-b", "feature.txt", "x\n", "Feature");

    let outcome = product
        .run(Mode::FetchAllChanges, &mut DefaultPrompter, true)
        .unwrap();
    let summary = completed(outcome);

    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].display_path(), "svc-b");
    assert_eq!(summary.changes[0].new, oid(&b2));
    assert_eq!(summary.changes[0].commits, 1);
    assert!(summary.commit.is_none());

    let svc_b = product.op().join("svc-b");
    assert_eq!(run_git(&svc_b, &["rev-parse", "HEAD"]), b2);
    assert!(Git::open(&svc_b).unwrap().current_branch().unwrap().is_none());
}

#[test]
fn fetch_all_changes_with_pull_stays_on_branch() {
    let product = Product::new();
    let a2 = product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");

    let ctx = Context {
        cwd: Some(product.op()),
        quiet: true,
        pull: true,
        ..Default::default()
    };
    let mut prompter = DefaultPrompter;
    let mut session = Session::new(product.op_git(), ctx, Config::default(), &mut prompter).unwrap();
    completed(engine::run(Mode::FetchAllChanges, &mut session).unwrap());

    let svc_a = Git::open(&product.op().join("svc-a")).unwrap();
    assert_eq!(
        svc_a.current_branch().unwrap(),
        Some(BranchName::new("main").unwrap())
    );
    assert_eq!(svc_a.head_oid().unwrap(), oid(&a2));
}

#[test]
fn fetch_all_changes_reports_meta_mismatch_as_warning() {
    let product = Product::new();
    product.commit_upstream("meta", "schema.yml", "v: 2\n", "Meta 2");
    let b2 = product.bump_service_meta("svc-b");

    let summary = completed(
        product
            .run(Mode::FetchAllChanges, &mut DefaultPrompter, true)
            .unwrap(),
    );

    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].new, oid(&b2));
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("meta submodule is inconsistent"));
}

// =============================================================================
// staging
// =============================================================================

#[test]
fn staging_records_new_commits_and_is_idempotent() {
    let product = Product::new();
    let a2 = product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");

    let summary = completed(
        product
            .run(Mode::Staging, &mut DefaultPrompter, true)
            .unwrap(),
    );
    assert_eq!(summary.branch, Some(BranchName::new("staging/4.2.8").unwrap()));
    assert_eq!(summary.version, Some(Version::new(4, 2, 8)));
    assert!(!summary.pushed);
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].new, oid(&a2));

    let git = product.op_git();
    let head = git.head_oid().unwrap();
    assert_eq!(git.read_file_at(&head, "VERSION").unwrap().as_deref(), Some("4.2.8\n"));
    assert_eq!(
        git.gitlink_at(&head, Path::new("svc-a")).unwrap(),
        Some(oid(&a2))
    );
    let svc_a = Git::open(&product.op().join("svc-a")).unwrap();
    assert_eq!(
        svc_a
            .local_branch(&BranchName::new("staging/4.2.8").unwrap())
            .unwrap(),
        Some(oid(&a2))
    );

    // Second run: nothing new upstream.
    let before = product.op_head();
    let outcome = product
        .run(Mode::Staging, &mut DefaultPrompter, true)
        .unwrap();
    assert!(matches!(outcome, Outcome::Aborted(AbortReason::NoChanges)));
    assert_eq!(product.op_head(), before);
}

#[test]
fn staging_with_local_never_pushes() {
    let product = Product::new();
    product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");

    completed(
        product
            .run(Mode::Staging, &mut DefaultPrompter, true)
            .unwrap(),
    );

    assert!(!product.remote_heads("root").contains("staging/"));
    assert!(!product.remote_heads("svc-a").contains("staging/"));
}

#[test]
fn staging_pushes_root_and_touched_submodules() {
    let product = Product::new();
    let a2 = product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");

    let summary = completed(
        product
            .run(Mode::Staging, &mut DefaultPrompter, false)
            .unwrap(),
    );
    assert!(summary.pushed);

    let root_heads = product.remote_heads("root");
    assert!(root_heads.contains("refs/heads/staging/4.2.8"));
    assert!(root_heads.contains(&product.op_head()));

    let svc_heads = product.remote_heads("svc-a");
    assert!(svc_heads.contains(&format!("{}\trefs/heads/staging/4.2.8", a2)));
    assert!(!product.remote_heads("svc-b").contains("staging/"));
}

#[test]
fn staging_declined_everywhere_aborts_cleanly() {
    let product = Product::new();
    let before = product.op_head();

    let mut prompter = ScriptedPrompter::new([Answer::Default, Answer::No, Answer::No]);
    let outcome = product.run(Mode::Staging, &mut prompter, true).unwrap();

    assert!(matches!(outcome, Outcome::Aborted(AbortReason::Declined(_))));
    assert_eq!(prompter.remaining(), 0);
    assert!(prompter.asked()[1].contains("staging/4.2.8"));
    assert_eq!(product.op_head(), before);
}

#[test]
fn staging_refuses_dirty_worktree() {
    let product = Product::new();
    std::fs::write(product.op().join("VERSION"), "9.9.9\n").unwrap();

    let err = product
        .run(Mode::Staging, &mut DefaultPrompter, true)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Precondition { .. }));
    assert!(err.to_string().contains("uncommitted changes"));
}

#[test]
fn staging_stops_on_meta_mismatch() {
    let product = Product::new();
    product.commit_upstream("meta", "schema.yml", "v: 2\n", "Meta 2");
    product.bump_service_meta("svc-b");

    let err = product
        .run(Mode::Staging, &mut DefaultPrompter, false)
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Consistency(VerifyError::MetaMismatch { .. })
    ));
    assert!(!product.remote_heads("root").contains("staging/"));
    assert!(!product.remote_heads("svc-b").contains("staging/"));
}

#[test]
fn staging_requires_configured_submodule_branch() {
    let product = Product::new();
    let root = product.work("root");
    run_git(&root, &["config", "-f", ".gitmodules", "submodule.svc-a.branch", "develop"]);
    run_git(&root, &["add", ".gitmodules"]);
    run_git(&root, &["commit", "-m", "Track develop"]);
    run_git(&root, &["push", "--quiet", "origin", "main"]);

    let err = product
        .run(Mode::Staging, &mut DefaultPrompter, true)
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Precondition { .. }));
    assert!(err.to_string().contains("svc-a: remote branch origin/develop not found"));
}

#[test]
fn staging_rejects_version_without_next_patch() {
    let product = Product::new();
    product.commit_upstream("root", "VERSION", "4.2.18446744073709551615\n", "Max patch");

    let err = product
        .run(Mode::Staging, &mut DefaultPrompter, true)
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Precondition { .. }));
    assert!(err.to_string().contains("has no next patch release"));
}

// =============================================================================
// stable
// =============================================================================

#[test]
fn stable_without_staging_update_aborts() {
    let product = Product::new();
    product.push_branch("root", "staging/4.2.8");
    product.push_branch("root", "stable/4.2.x");

    let before = product.op_commit_count();
    let outcome = product
        .run(Mode::Stable, &mut DefaultPrompter, true)
        .unwrap();

    match outcome {
        Outcome::Aborted(reason @ AbortReason::NoStagingUpdate { .. }) => {
            assert!(reason.to_string().starts_with("no staging update found"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(product.op_commit_count(), before);
}

#[test]
fn stable_without_any_staging_branch_fails() {
    let product = Product::new();
    let err = product
        .run(Mode::Stable, &mut DefaultPrompter, true)
        .unwrap_err();
    assert!(err.to_string().contains("no staging/* branch"));
}

#[test]
fn stable_merges_staging_into_stable_line() {
    let product = Product::new();
    product.push_branch("root", "stable/4.2.x");

    let a2 = product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");
    product.publish_staging("4.2.8", &[("svc-a", a2.as_str())]);

    let summary = completed(
        product
            .run(Mode::Stable, &mut DefaultPrompter, true)
            .unwrap(),
    );
    assert_eq!(summary.branch, Some(BranchName::new("stable/4.2.x").unwrap()));
    assert_eq!(summary.version, Some(Version::new(4, 2, 8)));
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].display_path(), "svc-a");

    let git = product.op_git();
    assert_eq!(
        git.current_branch().unwrap(),
        Some(BranchName::new("stable/4.2.x").unwrap())
    );
    let head = git.head_oid().unwrap();
    assert_eq!(git.read_file_at(&head, "VERSION").unwrap().as_deref(), Some("4.2.8\n"));
    assert_eq!(
        git.gitlink_at(&head, Path::new("svc-a")).unwrap(),
        Some(oid(&a2))
    );

    let sub = Git::open(&product.op().join("svc-a")).unwrap();
    assert_eq!(
        sub.local_branch(&BranchName::new("stable/4.2.x").unwrap())
            .unwrap(),
        Some(oid(&a2))
    );
    assert!(!product.remote_heads("root").contains(&head.to_string()));
}

#[test]
fn stable_pushes_root_and_touched_submodules() {
    let product = Product::new();
    product.push_branch("root", "stable/4.2.x");
    let a2 = product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");
    product.publish_staging("4.2.8", &[("svc-a", a2.as_str())]);

    let summary = completed(
        product
            .run(Mode::Stable, &mut DefaultPrompter, false)
            .unwrap(),
    );
    assert!(summary.pushed);

    let root_heads = product.remote_heads("root");
    assert!(root_heads.contains(&format!("{}\trefs/heads/stable/4.2.x", product.op_head())));
    assert!(product
        .remote_heads("svc-a")
        .contains(&format!("{}\trefs/heads/stable/4.2.x", a2)));
    assert!(!product.remote_heads("svc-b").contains("stable/"));
}

#[test]
fn stable_stops_on_meta_mismatch_at_target() {
    let product = Product::new();
    product.commit_upstream("meta", "schema.yml", "v: 2\n", "Meta 2");
    let b2 = product.bump_service_meta("svc-b");
    product.publish_staging("4.2.8", &[("svc-b", b2.as_str())]);

    let err = product
        .run(Mode::Stable, &mut DefaultPrompter, false)
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Consistency(VerifyError::MetaMismatch { .. })
    ));
    assert!(!product.remote_heads("root").contains("stable/"));
    assert!(!product.remote_heads("svc-b").contains("stable/"));
}

// =============================================================================
// hotfix
// =============================================================================

/// Publish `stable/4.2.x` for the root and svc-a, then add a fix on svc-a's
/// stable branch. Returns the fix commit.
fn prepare_hotfix(product: &Product) -> String {
    product.push_branch("root", "stable/4.2.x");
    product.push_branch("svc-a", "stable/4.2.x");
    let work = product.work("svc-a");
    run_git(&work, &["checkout", "--quiet", "stable/4.2.x"]);
    product.commit_upstream("svc-a", "fix.txt", "fix\n", "Fix")
}

#[test]
fn hotfix_bumps_patch_and_records_fix() {
    let product = Product::new();
    let fix = prepare_hotfix(&product);

    let summary = completed(
        product
            .run(Mode::Hotfix, &mut DefaultPrompter, true)
            .unwrap(),
    );
    assert_eq!(summary.version, Some(Version::new(4, 2, 8)));
    assert_eq!(summary.branch, Some(BranchName::new("stable/4.2.x").unwrap()));
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].new, oid(&fix));
    assert!(!summary.pushed);

    let git = product.op_git();
    let head = git.head_oid().unwrap();
    assert_eq!(git.read_file_at(&head, "VERSION").unwrap().as_deref(), Some("4.2.8\n"));
    assert_eq!(git.commit_info(&head).unwrap().summary, "Hotfix 4.2.8");
}

#[test]
fn hotfix_refuses_version_that_does_not_increase() {
    let product = Product::new();
    prepare_hotfix(&product);

    let mut prompter = ScriptedPrompter::new([Answer::Text("4.2.7".into())]);
    let err = product.run(Mode::Hotfix, &mut prompter, true).unwrap_err();
    assert!(matches!(err, WorkflowError::Precondition { .. }));
}

#[test]
fn hotfix_declined_branch_switch_is_an_error() {
    let product = Product::new();
    prepare_hotfix(&product);
    let before = product.op_head();

    let mut prompter = ScriptedPrompter::new([Answer::Default, Answer::No]);
    let err = product.run(Mode::Hotfix, &mut prompter, true).unwrap_err();

    assert!(matches!(err, WorkflowError::BranchMismatch { .. }));
    assert_eq!(product.op_head(), before);
}

#[test]
fn hotfix_without_stable_branch_fails() {
    let product = Product::new();
    let err = product
        .run(Mode::Hotfix, &mut DefaultPrompter, true)
        .unwrap_err();
    assert!(err.to_string().contains("no stable/* branch"));
}

/// Like [`prepare_hotfix`], but the fix on svc-a's stable branch also moves
/// its meta submodule away from the one svc-b embeds.
fn prepare_hotfix_with_new_meta(product: &Product) -> String {
    product.push_branch("root", "stable/4.2.x");
    product.push_branch("svc-a", "stable/4.2.x");
    run_git(&product.work("svc-a"), &["checkout", "--quiet", "stable/4.2.x"]);
    product.commit_upstream("meta", "schema.yml", "v: 2\n", "Meta 2");
    product.bump_service_meta("svc-a")
}

#[test]
fn hotfix_meta_mismatch_aborts_by_default() {
    let product = Product::new();
    prepare_hotfix_with_new_meta(&product);

    let outcome = product
        .run(Mode::Hotfix, &mut DefaultPrompter, true)
        .unwrap();

    assert!(matches!(outcome, Outcome::Aborted(AbortReason::Declined(_))));
}

#[test]
fn hotfix_meta_mismatch_can_be_accepted() {
    let product = Product::new();
    let fix = prepare_hotfix_with_new_meta(&product);

    let mut prompter = ScriptedPrompter::new([
        Answer::Default,
        Answer::Default,
        Answer::Default,
        Answer::Yes,
    ]);
    let summary = completed(product.run(Mode::Hotfix, &mut prompter, true).unwrap());

    assert_eq!(prompter.remaining(), 0);
    assert!(prompter.asked()[3].contains("Continue anyway"));
    assert_eq!(summary.version, Some(Version::new(4, 2, 8)));
    assert_eq!(summary.changes.len(), 1);
    assert_eq!(summary.changes[0].new, oid(&fix));
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("meta submodule is inconsistent"));
}

#[test]
fn stable_after_hotfix_merges_diverged_submodule_pointers() {
    let product = Product::new();
    let fix = prepare_hotfix(&product);
    completed(
        product
            .run(Mode::Hotfix, &mut DefaultPrompter, false)
            .unwrap(),
    );

    run_git(&product.work("svc-a"), &["checkout", "--quiet", "main"]);
    let a2 = product.commit_upstream("svc-a", "feature.txt", "x\n", "Feature");
    product.publish_staging("4.2.9", &[("svc-a", a2.as_str())]);

    let summary = completed(
        product
            .run(Mode::Stable, &mut DefaultPrompter, false)
            .unwrap(),
    );
    assert!(summary.pushed);
    assert_eq!(summary.version, Some(Version::new(4, 2, 9)));

    let git = product.op_git();
    let head = git.head_oid().unwrap();
    assert_eq!(git.read_file_at(&head, "VERSION").unwrap().as_deref(), Some("4.2.9\n"));

    let merged = git.gitlink_at(&head, Path::new("svc-a")).unwrap().unwrap();
    let sub = Git::open(&product.op().join("svc-a")).unwrap();
    assert!(sub.is_ancestor(&oid(&fix), &merged).unwrap());
    assert!(sub.is_ancestor(&oid(&a2), &merged).unwrap());
    assert!(product
        .remote_heads("svc-a")
        .contains(&format!("{}\trefs/heads/stable/4.2.x", merged)));
    assert!(product
        .remote_heads("root")
        .contains(&format!("{}\trefs/heads/stable/4.2.x", head)));
}
