use std::thread;

use mem_fs::MemFileSystem;

#[test]
fn one_lock_serializes_every_operation() {
    let mfs = MemFileSystem::with_blocks(64).unwrap().into_shared();
    mfs.lock().mkdir("/logs").unwrap();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let mfs = mfs.clone();
            thread::spawn(move || {
                let path = format!("/logs/worker{worker}");
                mfs.lock().mkfile(&path).unwrap();
                for round in 0..10 {
                    let line = format!("{worker}:{round}\n");
                    mfs.lock().writef(&path, line.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mfs = mfs.lock();
    assert_eq!(mfs.list("/logs").unwrap().len(), 4);
    for worker in 0..4 {
        let (data, _) = mfs.readf(&format!("/logs/worker{worker}")).unwrap();
        let text = String::from_utf8(data).unwrap();
        assert_eq!(text.lines().count(), 10);
        assert!(text.lines().all(|line| line.starts_with(&format!("{worker}:"))));
    }
    assert!(mfs.is_consistent());
}
