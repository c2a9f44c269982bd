//! Tests for bundle sources
//!
//! These tests build real gzip tarballs in a temporary directory to check
//! indexing, path tolerance and absent-member handling.

#[cfg(test)]
mod tarball_tests {
    use crate::archive::{BundleSource, TarGzArchive};
    use crate::error::BundleError;
    use crate::test_support::{sample_tarball, write_raw_tarball, write_tarball, PODS_GET};
    use tempfile::TempDir;

    #[test]
    fn test_open_indexes_members_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tarball(
            &temp_dir,
            "bundle.tgz",
            &[("kubernetes/a.txt", "a"), ("kubernetes/b.txt", "b")],
        );

        let archive = TarGzArchive::open(&path).unwrap();
        assert_eq!(
            archive.member_names(),
            &["kubernetes/a.txt".to_string(), "kubernetes/b.txt".to_string()]
        );
        assert_eq!(archive.path(), path.as_path());
    }

    #[test]
    fn test_read_tolerates_current_dir_marker() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tarball(
            &temp_dir,
            "bundle.tgz",
            &[("kubernetes/ns1/get/pods.txt", PODS_GET)],
        );
        let archive = TarGzArchive::open(&path).unwrap();

        let with_marker = archive.read_text("./kubernetes/ns1/get/pods.txt").unwrap();
        let without_marker = archive.read_text("kubernetes/ns1/get/pods.txt").unwrap();

        assert_eq!(with_marker.as_deref(), Some(PODS_GET));
        assert_eq!(with_marker, without_marker);
    }

    #[test]
    fn test_read_finds_marker_prefixed_members() {
        let temp_dir = TempDir::new().unwrap();
        let path = sample_tarball(&temp_dir);
        let archive = TarGzArchive::open(&path).unwrap();

        assert!(archive.exists("kubernetes/viya/get/pods.txt"));
        let content = archive.read_text("kubernetes/viya/get/pods.txt").unwrap();
        assert_eq!(content.as_deref(), Some(PODS_GET));
    }

    #[test]
    fn test_absent_member_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = sample_tarball(&temp_dir);
        let archive = TarGzArchive::open(&path).unwrap();

        assert!(!archive.exists("kubernetes/viya/get/secrets.txt"));
        assert!(archive
            .read_text("kubernetes/viya/get/secrets.txt")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_dir_excludes_directory_itself() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tarball(
            &temp_dir,
            "bundle.tgz",
            &[
                ("kubernetes/viya/get/", ""),
                ("kubernetes/viya/get/pods.txt", "x"),
                ("kubernetes/viya/get/services.txt", "y"),
                ("kubernetes/viya/getter/other.txt", "z"),
            ],
        );
        let archive = TarGzArchive::open(&path).unwrap();

        let listed = archive.list_dir("./kubernetes/viya/get");
        assert_eq!(
            listed,
            vec![
                "kubernetes/viya/get/pods.txt".to_string(),
                "kubernetes/viya/get/services.txt".to_string()
            ]
        );
    }

    #[test]
    fn test_non_utf8_member_is_listed_and_readable() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_raw_tarball(
            &temp_dir,
            "bundle.tgz",
            &[
                (&b"kubernetes/viya/logs/caf\xe9_web.log"[..], &b"latin-1 pod"[..]),
                (&b"kubernetes/viya/logs/plain_web.log"[..], &b"plain"[..]),
            ],
        );
        let archive = TarGzArchive::open(&path).unwrap();

        let listed = archive.list_dir("kubernetes/viya/logs");
        assert_eq!(listed.len(), 2);
        let content = archive.read_text(&listed[0]).unwrap();
        assert_eq!(content.as_deref(), Some("latin-1 pod"));
        assert_eq!(
            archive
                .read_text("./kubernetes/viya/logs/plain_web.log")
                .unwrap()
                .as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn test_missing_archive_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let result = TarGzArchive::open(temp_dir.path().join("nope.tgz"));
        assert!(matches!(result, Err(BundleError::ArchiveUnreadable { .. })));
    }

    #[test]
    fn test_corrupt_archive_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.tgz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        let result = TarGzArchive::open(&path);
        assert!(matches!(result, Err(BundleError::ArchiveUnreadable { .. })));
    }
}

#[cfg(test)]
mod memory_tests {
    use crate::archive::{find_member, strip_current_dir, BundleSource, MemoryBundle};

    #[test]
    fn test_memory_bundle_replaces_members() {
        let bundle = MemoryBundle::new()
            .with_file("kubernetes/x.txt", "old")
            .with_file("kubernetes/x.txt", "new");

        assert_eq!(bundle.member_names().len(), 1);
        assert_eq!(
            bundle.read_text("./kubernetes/x.txt").unwrap().as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_find_member_tries_each_spelling() {
        let names = vec![
            "./kubernetes/a.txt".to_string(),
            "kubernetes/b.txt".to_string(),
        ];
        assert_eq!(find_member(&names, "kubernetes/a.txt"), Some("./kubernetes/a.txt"));
        assert_eq!(find_member(&names, "./kubernetes/b.txt"), Some("kubernetes/b.txt"));
        assert_eq!(find_member(&names, "././kubernetes/a.txt"), Some("./kubernetes/a.txt"));
        assert_eq!(find_member(&names, "kubernetes/c.txt"), None);
    }

    #[test]
    fn test_strip_current_dir() {
        assert_eq!(strip_current_dir("./a/b"), "a/b");
        assert_eq!(strip_current_dir("././a"), "a");
        assert_eq!(strip_current_dir(".get-k8s-info/x"), ".get-k8s-info/x");
    }
}
