// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use flate2::read::GzDecoder;
use rollfile_core::naming::{compare_stems, stem};
use rollfile_core::{Compression, RollConfig, RollError, RollingFile};

fn dir_config(prefix: &str, dir: &Path) -> RollConfig {
    RollConfig::new(prefix, format!("{}/", dir.display()))
}

/// Archive file names owned by `prefix`, oldest first.
fn archives(dir: &Path, prefix: &str, active: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(prefix) && n != active)
        .collect();
    names.sort_by(|a, b| compare_stems(stem(prefix, a), stem(prefix, b)));
    names
}

fn read_archive(path: &Path) -> Vec<u8> {
    let mut content = Vec::new();
    if path.extension().is_some_and(|e| e == "gz") {
        GzDecoder::new(fs::File::open(path).unwrap())
            .read_to_end(&mut content)
            .unwrap();
    } else {
        content = fs::read(path).unwrap();
    }
    content
}

#[test]
fn test_rotation_happens_before_crossing_limit() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("test-", tmp.path())
        .with_compression(Compression::None)
        .with_max_size(1024);
    let file = RollingFile::new(cfg).unwrap();

    // 93 * 11 = 1023 bytes fit; the 94th payload would make 1034.
    for _ in 0..93 {
        assert_eq!(file.write(b"hello world").unwrap(), 11);
    }
    assert!(archives(tmp.path(), "test-", "test-.log").is_empty());
    assert_eq!(fs::metadata(file.active_path()).unwrap().len(), 1023);

    file.write(b"hello world").unwrap();
    file.close();

    let names = archives(tmp.path(), "test-", "test-.log");
    assert_eq!(names.len(), 1, "{:?}", names);
    assert!(names[0].ends_with(".log"));
    assert_eq!(fs::metadata(tmp.path().join(&names[0])).unwrap().len(), 1023);
    assert_eq!(fs::read(tmp.path().join("test-.log")).unwrap(), b"hello world");
}

#[test]
fn test_active_file_never_exceeds_limit() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("size-", tmp.path())
        .with_compression(Compression::None)
        .with_max_size(100)
        .with_max_archives(1000);
    let file = RollingFile::new(cfg).unwrap();

    for i in 0..500usize {
        let payload = vec![b'x'; 1 + (i * 7) % 100];
        file.write(&payload).unwrap();
        assert!(fs::metadata(file.active_path()).unwrap().len() <= 100);
    }
    file.close();

    for name in archives(tmp.path(), "size-", "size-.log") {
        assert!(fs::metadata(tmp.path().join(name)).unwrap().len() <= 100);
    }
}

#[test]
fn test_oversized_payload_has_no_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("big-", tmp.path()).with_max_size(8);
    let file = RollingFile::new(cfg).unwrap();

    match file.write(b"123456789") {
        Err(RollError::PayloadTooLarge { len: 9, max: 8 }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);

    file.write(b"12345678").unwrap();
    assert!(file.write(b"123456789").is_err());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    assert_eq!(fs::read(file.active_path()).unwrap(), b"12345678");
}

#[test]
fn test_retention_keeps_most_recent_archives() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("keep-", tmp.path())
        .with_max_size(10)
        .with_max_archives(3);
    let file = RollingFile::new(cfg).unwrap();

    // Every payload after the first forces a rotation: 5 rotations in total.
    for i in 0..6 {
        file.write(format!("entry-{}\n", i).as_bytes()).unwrap();
    }
    file.close();

    let names = archives(tmp.path(), "keep-", "keep-.log");
    assert_eq!(names.len(), 3, "{:?}", names);
    let contents: Vec<Vec<u8>> = names
        .iter()
        .map(|n| read_archive(&tmp.path().join(n)))
        .collect();
    assert_eq!(
        contents,
        vec![
            b"entry-2\n".to_vec(),
            b"entry-3\n".to_vec(),
            b"entry-4\n".to_vec()
        ]
    );
    assert_eq!(fs::read(tmp.path().join("keep-.log")).unwrap(), b"entry-5\n");
}

#[test]
fn test_close_drains_pending_compression() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("drain-", tmp.path()).with_max_size(4);
    let file = RollingFile::new(cfg).unwrap();

    file.write(b"aaaa").unwrap();
    file.write(b"bbbb").unwrap();
    file.write(b"cccc").unwrap();
    file.close();

    let names = archives(tmp.path(), "drain-", "drain-.log");
    assert_eq!(names.len(), 2, "{:?}", names);
    assert!(names.iter().all(|n| n.ends_with(".log.gz")), "{:?}", names);
    assert_eq!(read_archive(&tmp.path().join(&names[0])), b"aaaa");
    assert_eq!(read_archive(&tmp.path().join(&names[1])), b"bbbb");
}

#[test]
fn test_close_drains_pending_prune() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("prune-", tmp.path())
        .with_max_size(4)
        .with_max_archives(1);
    let file = RollingFile::new(cfg).unwrap();

    file.write(b"aaaa").unwrap();
    file.write(b"bbbb").unwrap();
    file.write(b"cccc").unwrap();
    file.close();

    let names = archives(tmp.path(), "prune-", "prune-.log");
    assert_eq!(names.len(), 1, "{:?}", names);
    assert!(names[0].ends_with(".log.gz"), "{:?}", names);
    assert_eq!(read_archive(&tmp.path().join(&names[0])), b"bbbb");
}

#[test]
fn test_full_compression_queue_still_prunes() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("queue-", tmp.path())
        .with_max_size(4)
        .with_max_archives(2)
        .with_queue_capacity(1);
    let file = RollingFile::new(cfg).unwrap();

    // Every write after the first rotates, far faster than gzip drains.
    for i in 0..30 {
        file.write(format!("{:04}", i).as_bytes()).unwrap();
    }
    file.close();

    let names = archives(tmp.path(), "queue-", "queue-.log");
    assert_eq!(names.len(), 2, "{:?}", names);
    assert_eq!(read_archive(&tmp.path().join(&names[0])), b"0027");
    assert_eq!(read_archive(&tmp.path().join(&names[1])), b"0028");
    assert_eq!(fs::read(tmp.path().join("queue-.log")).unwrap(), b"0029");
}

#[test]
fn test_uncompressed_archives_are_still_pruned() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("plain-", tmp.path())
        .with_compression(Compression::None)
        .with_max_size(4)
        .with_max_archives(2);
    let file = RollingFile::new(cfg).unwrap();
    for payload in [b"0000", b"1111", b"2222", b"3333", b"4444"] {
        file.write(payload).unwrap();
    }
    file.close();

    let names = archives(tmp.path(), "plain-", "plain-.log");
    assert_eq!(names.len(), 2, "{:?}", names);
    assert_eq!(read_archive(&tmp.path().join(&names[0])), b"2222");
    assert_eq!(read_archive(&tmp.path().join(&names[1])), b"3333");
}

#[test]
fn test_concurrent_writers_never_split_payloads() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("conc-", tmp.path())
        .with_compression(Compression::None)
        .with_max_size(1000)
        .with_max_archives(1000);
    let file = Arc::new(RollingFile::new(cfg).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let file = Arc::clone(&file);
            thread::spawn(move || {
                for i in 0..200 {
                    let line = format!("t{}-{:05}\n", t, i);
                    assert_eq!(line.len(), 10);
                    file.write(line.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    file.close();

    let mut total = 0;
    let mut files = archives(tmp.path(), "conc-", "conc-.log");
    files.push("conc-.log".to_string());
    for name in files {
        let content = fs::read(tmp.path().join(&name)).unwrap();
        assert!(content.len() <= 1000);
        assert_eq!(content.len() % 10, 0, "{} has a torn line", name);
        for line in content.chunks(10) {
            assert_eq!(line[0], b't');
            assert_eq!(line[9], b'\n');
        }
        total += content.len();
    }
    assert_eq!(total, 4 * 200 * 10);
}

#[test]
fn test_fixed_active_name_in_nested_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("mylog").join("access");
    let cfg = RollConfig::new("acc-", target.to_str().unwrap())
        .with_compression(Compression::None)
        .with_max_size(6);
    let file = RollingFile::new(cfg).unwrap();
    assert!(tmp.path().join("mylog").is_dir());
    assert_eq!(file.active_path(), tmp.path().join("mylog").join("access.log"));

    file.write(b"first\n").unwrap();
    file.write(b"again\n").unwrap();
    file.close();

    let dir = tmp.path().join("mylog");
    assert_eq!(fs::read(dir.join("access.log")).unwrap(), b"again\n");
    let names = archives(&dir, "acc-", "access.log");
    assert_eq!(names.len(), 1, "{:?}", names);
    assert_eq!(read_archive(&dir.join(&names[0])), b"first\n");
}

#[test]
fn test_io_write_adapter() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = dir_config("io-", tmp.path()).with_max_size(4);
    let file = RollingFile::new(cfg).unwrap();

    writeln!(&file, "ok").unwrap();
    let err = (&file).write_all(b"way too long").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    Write::flush(&mut &file).unwrap();
    file.close();
    let err = Write::write(&mut &file, b"x").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
}

#[test]
fn test_drop_closes_and_drains() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let cfg = dir_config("drop-", tmp.path()).with_max_size(4);
        let file = RollingFile::new(cfg).unwrap();
        file.write(b"aaaa").unwrap();
        file.write(b"bbbb").unwrap();
    }
    let names = archives(tmp.path(), "drop-", "drop-.log");
    assert_eq!(names.len(), 1, "{:?}", names);
    assert!(names[0].ends_with(".log.gz"));
}
