use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::roots::{LinkMetadata, PathProvider, RootKey, TokioLinkMetadata};

use super::*;

struct StaticPaths {
    app_data: PathBuf,
}

impl PathProvider for StaticPaths {
    fn app_data_dir(&self) -> crate::error::Result<PathBuf> {
        Ok(self.app_data.clone())
    }
}

/// Wraps the real metadata provider and counts how often the guard walk
/// touches the filesystem.
struct CountingMetadata {
    inner: TokioLinkMetadata,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LinkMetadata for CountingMetadata {
    async fn is_symlink(&self, path: &Path) -> io::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.is_symlink(path).await
    }
}

fn test_context(dir: &Path) -> Context {
    Context::with_providers(
        &StaticPaths {
            app_data: dir.to_path_buf(),
        },
        Arc::new(TokioLinkMetadata),
    )
    .expect("context")
}

fn counting_context(dir: &Path) -> (Context, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let ctx = Context::with_providers(
        &StaticPaths {
            app_data: dir.to_path_buf(),
        },
        Arc::new(CountingMetadata {
            inner: TokioLinkMetadata,
            calls: Arc::clone(&calls),
        }),
    )
    .expect("context");
    (ctx, calls)
}

#[tokio::test]
async fn write_then_read_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    let written = ctx
        .write_text(WriteTextRequest {
            root: RootKey::AppData,
            path: "notes.txt".to_string(),
            content: "hello vault".to_string(),
            create_parents: false,
        })
        .await
        .expect("write");
    assert!(written.created);
    assert_eq!(written.bytes_written, 11);
    assert_eq!(written.path, "notes.txt");

    let read = ctx
        .read_text(ReadTextRequest {
            root: RootKey::AppData,
            path: "notes.txt".to_string(),
        })
        .await
        .expect("read");
    assert_eq!(read.content, "hello vault");
    assert_eq!(read.bytes_read, 11);
}

#[tokio::test]
async fn write_reports_overwrite_as_not_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    for (expected_created, content) in [(true, "v1"), (false, "v2")] {
        let written = ctx
            .write_text(WriteTextRequest {
                root: RootKey::AppData,
                path: "state.json".to_string(),
                content: content.to_string(),
                create_parents: false,
            })
            .await
            .expect("write");
        assert_eq!(written.created, expected_created);
    }

    let read = ctx
        .read_text(ReadTextRequest {
            root: RootKey::AppData,
            path: "state.json".to_string(),
        })
        .await
        .expect("read");
    assert_eq!(read.content, "v2");
}

#[tokio::test]
async fn write_create_parents_builds_nested_attachment_dirs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    let written = ctx
        .write_text(WriteTextRequest {
            root: RootKey::Attachments,
            path: "pets/rex/vaccination.pdf".to_string(),
            content: "%PDF".to_string(),
            create_parents: true,
        })
        .await
        .expect("write");
    assert_eq!(written.path, "pets/rex/vaccination.pdf");
    assert!(dir
        .path()
        .join("attachments/pets/rex/vaccination.pdf")
        .is_file());
}

#[tokio::test]
async fn write_without_create_parents_needs_existing_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    let err = ctx
        .write_text(WriteTextRequest {
            root: RootKey::AppData,
            path: "missing/dir/file.txt".to_string(),
            content: String::new(),
            create_parents: false,
        })
        .await
        .expect_err("write must fail");
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn read_missing_file_passes_io_error_through() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    let err = ctx
        .read_text(ReadTextRequest {
            root: RootKey::AppData,
            path: "nope.txt".to_string(),
        })
        .await
        .expect_err("read must fail");
    match err {
        Error::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_paths_touch_no_filesystem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, calls) = counting_context(dir.path());

    let cases = [
        ("../escape.txt", ErrorKind::PathOutOfVault),
        ("a/../../escape.txt", ErrorKind::PathOutOfVault),
        ("/etc/passwd", ErrorKind::OutsideRoot),
        ("C:/windows/system32", ErrorKind::OutsideRoot),
        ("\\\\host\\share\\x", ErrorKind::UncRejected),
        ("//host/share/x", ErrorKind::UncRejected),
        ("", ErrorKind::Empty),
    ];

    for (path, expected) in cases {
        let err = ctx
            .write_text(WriteTextRequest {
                root: RootKey::AppData,
                path: path.to_string(),
                content: "owned".to_string(),
                create_parents: true,
            })
            .await
            .expect_err("must reject");
        assert_eq!(err.kind(), expected, "input {path:?}");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0, "guard must not run");
    assert_eq!(
        std::fs::read_dir(dir.path()).expect("read_dir").count(),
        0,
        "no filesystem side effects"
    );
}

#[tokio::test]
async fn hostile_filenames_never_reach_the_filesystem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, calls) = counting_context(dir.path());

    // Reserved device names, control characters, forbidden characters and
    // trailing-whitespace segments must all die in the sanitizer, not at the
    // platform layer.
    let cases = [
        "NUL",
        "com1/report.pdf",
        "evil\u{1}name",
        "file\u{0}.txt",
        "dir /file.txt",
        "a*b",
    ];
    for path in cases {
        let err = ctx
            .write_text(WriteTextRequest {
                root: RootKey::AppData,
                path: path.to_string(),
                content: "x".to_string(),
                create_parents: true,
            })
            .await
            .expect_err("must reject");
        assert_eq!(err.kind(), ErrorKind::FilenameInvalid, "input {path:?}");
    }

    let err = ctx
        .read_text(ReadTextRequest {
            root: RootKey::AppData,
            path: "NUL".to_string(),
        })
        .await
        .expect_err("must reject");
    assert_eq!(err.kind(), ErrorKind::FilenameInvalid);
    let err = ctx
        .exists(ExistsRequest {
            root: RootKey::AppData,
            path: "evil\u{1}name".to_string(),
        })
        .await
        .expect_err("must reject");
    assert_eq!(err.kind(), ErrorKind::FilenameInvalid);

    assert_eq!(calls.load(Ordering::SeqCst), 0, "guard must not run");
    assert_eq!(
        std::fs::read_dir(dir.path()).expect("read_dir").count(),
        0,
        "no filesystem side effects"
    );
}

#[tokio::test]
async fn every_operation_screens_traversal_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, calls) = counting_context(dir.path());
    let bad = "../x".to_string();
    let root = RootKey::Attachments;

    let kinds = [
        ctx.read_text(ReadTextRequest { root, path: bad.clone() })
            .await
            .expect_err("read_text")
            .kind(),
        ctx.write_text(WriteTextRequest {
            root,
            path: bad.clone(),
            content: String::new(),
            create_parents: false,
        })
        .await
        .expect_err("write_text")
        .kind(),
        ctx.read_dir(ReadDirRequest { root, path: bad.clone() })
            .await
            .expect_err("read_dir")
            .kind(),
        ctx.mkdir(MkdirRequest {
            root,
            path: bad.clone(),
            recursive: true,
        })
        .await
        .expect_err("mkdir")
        .kind(),
        ctx.remove(RemoveRequest {
            root,
            path: bad.clone(),
            recursive: true,
        })
        .await
        .expect_err("remove")
        .kind(),
        ctx.exists(ExistsRequest { root, path: bad })
            .await
            .expect_err("exists")
            .kind(),
    ];
    assert!(kinds.iter().all(|kind| *kind == ErrorKind::PathOutOfVault));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn guard_runs_once_per_successful_call() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, calls) = counting_context(dir.path());

    // Single missing segment: the walk makes exactly one metadata query.
    let result = ctx
        .exists(ExistsRequest {
            root: RootKey::AppData,
            path: "ghost.txt".to_string(),
        })
        .await
        .expect("exists");
    assert!(!result.exists);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exists_becomes_true_after_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());
    let request = ExistsRequest {
        root: RootKey::AppData,
        path: "flag.txt".to_string(),
    };

    assert!(!ctx.exists(request.clone()).await.expect("exists").exists);
    ctx.write_text(WriteTextRequest {
        root: RootKey::AppData,
        path: "flag.txt".to_string(),
        content: "1".to_string(),
        create_parents: false,
    })
    .await
    .expect("write");
    assert!(ctx.exists(request).await.expect("exists").exists);
}

#[tokio::test]
async fn mkdir_then_read_dir_sorts_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    ctx.mkdir(MkdirRequest {
        root: RootKey::Attachments,
        path: "bills".to_string(),
        recursive: true,
    })
    .await
    .expect("mkdir");
    for name in ["zeta.txt", "alpha.txt"] {
        ctx.write_text(WriteTextRequest {
            root: RootKey::Attachments,
            path: format!("bills/{name}"),
            content: "x".to_string(),
            create_parents: false,
        })
        .await
        .expect("write");
    }
    ctx.mkdir(MkdirRequest {
        root: RootKey::Attachments,
        path: "bills/2026".to_string(),
        recursive: false,
    })
    .await
    .expect("mkdir nested");

    let listing = ctx
        .read_dir(ReadDirRequest {
            root: RootKey::Attachments,
            path: "bills".to_string(),
        })
        .await
        .expect("read_dir");
    let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["2026", "alpha.txt", "zeta.txt"]);
    assert_eq!(listing.entries[0].kind, "dir");
    assert_eq!(listing.entries[1].kind, "file");
    assert_eq!(listing.skipped_io_errors, 0);
}

#[tokio::test]
async fn mkdir_non_recursive_requires_parent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    let err = ctx
        .mkdir(MkdirRequest {
            root: RootKey::AppData,
            path: "a/b/c".to_string(),
            recursive: false,
        })
        .await
        .expect_err("mkdir must fail");
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn remove_handles_files_and_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    ctx.write_text(WriteTextRequest {
        root: RootKey::AppData,
        path: "junk/keep/file.txt".to_string(),
        content: "x".to_string(),
        create_parents: true,
    })
    .await
    .expect("write");

    let removed = ctx
        .remove(RemoveRequest {
            root: RootKey::AppData,
            path: "junk/keep/file.txt".to_string(),
            recursive: false,
        })
        .await
        .expect("remove file");
    assert!(!removed.was_dir);

    // Non-empty directory without `recursive` fails with the platform error.
    ctx.write_text(WriteTextRequest {
        root: RootKey::AppData,
        path: "junk/keep/other.txt".to_string(),
        content: "x".to_string(),
        create_parents: false,
    })
    .await
    .expect("write");
    let err = ctx
        .remove(RemoveRequest {
            root: RootKey::AppData,
            path: "junk".to_string(),
            recursive: false,
        })
        .await
        .expect_err("remove must fail");
    assert_eq!(err.kind(), ErrorKind::Io);

    let removed = ctx
        .remove(RemoveRequest {
            root: RootKey::AppData,
            path: "junk".to_string(),
            recursive: true,
        })
        .await
        .expect("remove tree");
    assert!(removed.was_dir);
    assert!(!dir.path().join("junk").exists());
}

#[tokio::test]
async fn remove_missing_passes_io_error_through() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());

    let err = ctx
        .remove(RemoveRequest {
            root: RootKey::AppData,
            path: "ghost".to_string(),
            recursive: false,
        })
        .await
        .expect_err("remove must fail");
    match err {
        Error::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[cfg(unix)]
mod symlinks {
    use std::os::unix::fs::symlink;

    use super::*;

    #[tokio::test]
    async fn symlinked_directory_blocks_every_access() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = test_context(dir.path());

        std::fs::create_dir(dir.path().join("real")).expect("create_dir");
        std::fs::write(dir.path().join("real/data.txt"), "secret").expect("write");
        symlink(dir.path().join("real"), dir.path().join("link")).expect("symlink");

        let err = ctx
            .read_text(ReadTextRequest {
                root: RootKey::AppData,
                path: "link/data.txt".to_string(),
            })
            .await
            .expect_err("read must fail");
        assert_eq!(err.kind(), ErrorKind::Symlink);

        let err = ctx
            .write_text(WriteTextRequest {
                root: RootKey::AppData,
                path: "link/new.txt".to_string(),
                content: "x".to_string(),
                create_parents: false,
            })
            .await
            .expect_err("write must fail");
        assert_eq!(err.kind(), ErrorKind::Symlink);
        assert!(!dir.path().join("real/new.txt").exists());
    }

    #[tokio::test]
    async fn symlinked_leaf_is_rejected_even_when_target_is_inside() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = test_context(dir.path());

        std::fs::write(dir.path().join("real.txt"), "data").expect("write");
        symlink(dir.path().join("real.txt"), dir.path().join("alias.txt")).expect("symlink");

        let err = ctx
            .read_text(ReadTextRequest {
                root: RootKey::AppData,
                path: "alias.txt".to_string(),
            })
            .await
            .expect_err("read must fail");
        match err {
            Error::Symlink { path } => {
                assert_eq!(path, dir.path().join("alias.txt"));
            }
            other => panic!("expected Symlink, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn escape_symlink_cannot_be_probed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = test_context(dir.path());

        symlink("/", dir.path().join("out")).expect("symlink");
        let err = ctx
            .exists(ExistsRequest {
                root: RootKey::AppData,
                path: "out/etc/passwd".to_string(),
            })
            .await
            .expect_err("exists must fail");
        assert_eq!(err.kind(), ErrorKind::Symlink);
    }

    #[tokio::test]
    async fn missing_leaf_with_clean_ancestors_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = test_context(dir.path());

        std::fs::create_dir(dir.path().join("real")).expect("create_dir");
        let written = ctx
            .write_text(WriteTextRequest {
                root: RootKey::AppData,
                path: "real/new.txt".to_string(),
                content: "fresh".to_string(),
                create_parents: false,
            })
            .await
            .expect("write");
        assert!(written.created);
    }
}
