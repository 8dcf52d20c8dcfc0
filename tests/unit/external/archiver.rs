use super::*;

fn build_tree(root: &Path) {
    fs::write(root.join(DESCRIPTOR_FILE_NAME), "4 4 1\nc 1 0 part0\nc 1 0 part1\n").unwrap();
    let parts = [
        ("part0", ["000001.jpg", "000002.jpg"]),
        ("part1", ["000003.jpg", "000004.jpg"]),
    ];
    for (part, frames) in parts {
        fs::create_dir(root.join(part)).unwrap();
        for f in frames {
            fs::write(root.join(part).join(f), f.as_bytes()).unwrap();
        }
    }
}

fn entry_names(archive: &Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    zip.file_names().map(str::to_string).collect()
}

#[test]
fn stored_archive_has_relative_stored_entries_in_order() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    build_tree(src.path());
    let dest = out.path().join("nested/dir/bootanimation.zip");

    StoredZipArchiver.archive(src.path(), &dest).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "desc.txt",
            "part0/",
            "part0/000001.jpg",
            "part0/000002.jpg",
            "part1/",
            "part1/000003.jpg",
            "part1/000004.jpg",
        ]
    );
    for i in 0..zip.len() {
        assert_eq!(zip.by_index(i).unwrap().compression(), CompressionMethod::Stored);
    }

    let mut desc = String::new();
    std::io::Read::read_to_string(&mut zip.by_name("desc.txt").unwrap(), &mut desc).unwrap();
    assert!(desc.starts_with("4 4 1\n"));
}

#[test]
fn stored_archive_overwrites_and_is_reproducible() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    build_tree(src.path());
    let dest = out.path().join("bootanimation.zip");
    fs::write(&dest, vec![0xAB; 64 * 1024]).unwrap();

    StoredZipArchiver.archive(src.path(), &dest).unwrap();
    let first = fs::read(&dest).unwrap();
    StoredZipArchiver.archive(src.path(), &dest).unwrap();
    let second = fs::read(&dest).unwrap();

    assert_eq!(first, second);
    assert_eq!(entry_names(&dest).len(), 7);
}

#[test]
fn part_directories_sort_numerically() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(src.path().join(DESCRIPTOR_FILE_NAME), "1 1 1\n").unwrap();
    for i in [10, 2, 1, 0] {
        fs::create_dir(src.path().join(format!("part{i}"))).unwrap();
    }
    let dest = out.path().join("a.zip");
    StoredZipArchiver.archive(src.path(), &dest).unwrap();

    assert_eq!(
        entry_names(&dest),
        ["desc.txt", "part0/", "part1/", "part2/", "part10/"]
    );
}

#[test]
fn zip_tool_command_runs_inside_source_dir() {
    let archiver = ZipToolArchiver::new("/usr/bin/zip", true);
    let cmd = archiver.command(Path::new("/tmp/bootanim/result"), Path::new("/out/boot.zip"));

    assert_eq!(cmd.get_program(), "/usr/bin/zip");
    assert_eq!(cmd.get_current_dir(), Some(Path::new("/tmp/bootanim/result")));
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
    assert_eq!(args, ["-q", "-r", "-0", "/out/boot.zip", "."]);
}

#[test]
fn missing_zip_tool_is_an_archiving_error() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let archiver = ZipToolArchiver::new(src.path().join("no-such-zip"), true);
    let err = archiver
        .archive(src.path(), &out.path().join("boot.zip"))
        .unwrap_err();
    assert!(matches!(err, BootAnimError::Archiving(_)), "{err}");
}

#[test]
fn zip_tool_produces_store_only_archive_when_available() {
    let Some(zip_tool) = crate::config::tools::locate_tool(crate::config::tools::ZIP_TOOL, None)
    else {
        eprintln!("skipping: zip not on PATH");
        return;
    };

    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    build_tree(src.path());
    let dest = out.path().join("bootanimation.zip");
    // A stale archive must be replaced, not updated.
    let stale = tempfile::tempdir().unwrap();
    fs::write(stale.path().join("stale.txt"), "old").unwrap();
    StoredZipArchiver.archive(stale.path(), &dest).unwrap();

    ZipToolArchiver::new(zip_tool, true)
        .archive(src.path(), &dest)
        .unwrap();

    let mut names = entry_names(&dest);
    names.sort();
    assert_eq!(
        names,
        [
            "desc.txt",
            "part0/",
            "part0/000001.jpg",
            "part0/000002.jpg",
            "part1/",
            "part1/000003.jpg",
            "part1/000004.jpg",
        ]
    );
}

#[cfg(unix)]
#[test]
fn non_utf8_entry_name_is_rejected() {
    use std::os::unix::ffi::OsStrExt as _;

    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    build_tree(src.path());
    let odd = std::ffi::OsStr::from_bytes(b"frame\xff.jpg");
    if fs::write(src.path().join("part0").join(odd), b"x").is_err() {
        eprintln!("skipping: filesystem rejects non-UTF-8 names");
        return;
    }
    let dest = out.path().join("bootanimation.zip");

    let err = StoredZipArchiver.archive(src.path(), &dest).unwrap_err();
    assert!(matches!(err, BootAnimError::Archiving(_)), "{err}");
    assert!(err.to_string().contains("not valid UTF-8"), "{err}");
    assert!(!dest.exists());
}
