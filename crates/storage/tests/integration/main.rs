use {
    std::{
        sync::{Arc, Mutex},
        thread,
    },
    storage::{
        buffer::{BufferConfig, BufferManager, BufferType, PoolConfig, SlotBits, TrainKey},
        FileStore, MemoryStore, PAGE_SIZE,
    },
    tempfile::tempdir,
};

fn small_config() -> BufferConfig {
    BufferConfig {
        page_pool: PoolConfig::new(4, 5),
        train_pool: PoolConfig::new(2, 3),
        train_pages: 2,
        ..Default::default()
    }
}

#[test]
fn pages_survive_eviction_and_reopen() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path();

    {
        let store = FileStore::new(path).unwrap();
        let mut manager = BufferManager::new(small_config(), store).unwrap();

        for page_no in 0..16u32 {
            let key = TrainKey::new(1, page_no);
            let index = manager.get_train(key, BufferType::Page).unwrap();

            manager
                .frame_mut(BufferType::Page, index)
                .unwrap()
                .fill(page_no as u8);
            manager.set_dirty(&key, BufferType::Page).unwrap();
            manager.free_train(&key, BufferType::Page).unwrap();
        }

        // every page was dirtied once, so each eviction wrote exactly once
        let stats = manager.stats();
        assert_eq!(stats.misses, 16);
        assert!(stats.evictions >= 12);
        assert_eq!(stats.flushes, stats.evictions);

        manager.close().unwrap();
        assert_eq!(manager.stats().flushes, 16);
    }

    let store = FileStore::new(path).unwrap();
    let mut manager = BufferManager::new(small_config(), store).unwrap();

    for page_no in (0..16u32).rev() {
        let key = TrainKey::new(1, page_no);
        let index = manager.get_train(key, BufferType::Page).unwrap();

        let frame = manager.frame(BufferType::Page, index).unwrap();
        assert_eq!(frame.len(), PAGE_SIZE);
        assert!(frame.iter().all(|&b| b == page_no as u8));

        manager.free_train(&key, BufferType::Page).unwrap();
    }

    temp_dir.close().unwrap()
}

#[test]
fn trains_read_back_what_pages_wrote() {
    let temp_dir = tempdir().unwrap();
    let store = FileStore::new(temp_dir.path()).unwrap();
    let mut manager = BufferManager::new(small_config(), store).unwrap();

    for page_no in 0..2u32 {
        let key = TrainKey::new(0, 10 + page_no);
        let index = manager.get_train(key, BufferType::Page).unwrap();
        manager
            .frame_mut(BufferType::Page, index)
            .unwrap()
            .fill(0xa0 + page_no as u8);
        manager.set_dirty(&key, BufferType::Page).unwrap();
        manager.free_train(&key, BufferType::Page).unwrap();
    }
    manager.flush_all().unwrap();

    let key = TrainKey::new(0, 10);
    let index = manager.get_train(key, BufferType::Train).unwrap();
    let train = manager.frame(BufferType::Train, index).unwrap();

    assert!(train[..PAGE_SIZE].iter().all(|&b| b == 0xa0));
    assert!(train[PAGE_SIZE..].iter().all(|&b| b == 0xa1));

    temp_dir.close().unwrap()
}

#[test]
fn shared_manager_stays_consistent() {
    let manager = BufferManager::new(small_config(), MemoryStore::new()).unwrap();
    let manager = Arc::new(Mutex::new(manager));

    let handles: Vec<_> = (0..4u32)
        .map(|worker| {
            let manager = manager.clone();

            thread::spawn(move || {
                for i in 0..200u32 {
                    let key = TrainKey::new(worker, i % 7);
                    let mut manager = manager.lock().unwrap();

                    manager.get_train(key, BufferType::Page).unwrap();
                    if i % 3 == 0 {
                        manager.set_dirty(&key, BufferType::Page).unwrap();
                    }
                    manager.free_train(&key, BufferType::Page).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let manager = manager.lock().unwrap();
    let pool = manager.pool(BufferType::Page);

    for (index, slot) in pool.slots().iter().enumerate() {
        assert_eq!(slot.fixed(), 0);
        if let Some(key) = slot.key() {
            assert_eq!(pool.lookup(&key), Some(index));
        }
    }
    assert_eq!(manager.stats().hits + manager.stats().misses, 800);
    assert!(pool
        .slots()
        .iter()
        .filter(|slot| slot.bits().contains(SlotBits::DIRTY))
        .all(|slot| slot.key().is_some()));
}
