//! Batching collections delivering through caller-owned contexts.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use reflux::{BatchingCollection, CollectionChange, DispatchContext, Task};

#[test]
fn test_channel_context_delivers_on_consumer_thread() {
    let (tx, rx) = unbounded::<Task>();
    let context: Arc<dyn DispatchContext> = Arc::new(move |task: Task| {
        let _ = tx.send(task);
    });
    let list = BatchingCollection::with_context(Vec::new(), Some(context));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recv = seen.clone();
    list.collection_changed().connect(move |change: &CollectionChange<u32>| {
        recv.lock().push((thread::current().name().map(String::from), change.kind()));
    });

    let consumer = thread::Builder::new()
        .name("consumer".into())
        .spawn(move || {
            let mut ran = 0;
            while let Ok(task) = rx.recv() {
                task();
                ran += 1;
            }
            ran
        })
        .unwrap();

    list.push(1);
    {
        let _batch = list.batch();
        list.push(2);
        list.push(3);
    }
    drop(list);

    // push: len, items, added; flush: two buffered (len, items) pairs, reset.
    assert_eq!(consumer.join().unwrap(), 8);
    let consumer_name = Some("consumer".to_string());
    assert_eq!(
        *seen.lock(),
        vec![(consumer_name.clone(), "added"), (consumer_name, "reset")]
    );
}

#[test]
fn test_snapshot_is_consistent_under_concurrent_writes() {
    let list = Arc::new(BatchingCollection::<u32>::new());

    let writer = {
        let list = list.clone();
        thread::spawn(move || {
            for n in 0..500 {
                list.push_range([n, n]);
                if n % 3 == 0 {
                    let _ = list.remove_range(0, 2);
                }
            }
        })
    };

    for _ in 0..200 {
        // Pairs go in and out together, so a snapshot never sees half a pair.
        let snapshot = list.snapshot();
        assert_eq!(snapshot.len() % 2, 0);
    }
    writer.join().unwrap();
}

#[test]
fn test_flush_emits_buffered_properties_in_order() {
    let list = BatchingCollection::from_vec(vec!['a', 'b']);
    let props = Arc::new(Mutex::new(Vec::new()));
    let recv = props.clone();
    list.property_changed()
        .connect(move |change| recv.lock().push(change.name().to_string()));

    list.begin_update();
    list.move_item(0, 1).unwrap();
    list.push('c');
    list.end_update().unwrap();

    assert_eq!(*props.lock(), vec!["items", "len", "items"]);
}

fn descending_pairs(indices: &[usize]) -> usize {
    indices.windows(2).filter(|pair| pair[1] <= pair[0]).count()
}

fn record_added(list: &BatchingCollection<u32>) -> Arc<Mutex<Vec<usize>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recv = seen.clone();
    list.collection_changed().connect(move |change| {
        if let CollectionChange::Added { index, .. } = change {
            recv.lock().push(*index);
        }
    });
    seen
}

fn push_from_threads(list: &Arc<BatchingCollection<u32>>, threads: usize, per_thread: u32) {
    let writers: Vec<_> = (0..threads)
        .map(|_| {
            let list = list.clone();
            thread::spawn(move || {
                for n in 0..per_thread {
                    list.push(n);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
}

#[test]
fn test_concurrent_pushes_notify_in_mutation_order() {
    for _ in 0..10 {
        let list = Arc::new(BatchingCollection::<u32>::new());
        let seen = record_added(&list);

        push_from_threads(&list, 4, 1000);

        let seen = seen.lock();
        assert_eq!(seen.len(), 4000);
        assert_eq!(descending_pairs(&seen), 0);
        assert_eq!(seen.last(), Some(&3999));
    }
}

#[test]
fn test_concurrent_pushes_post_in_mutation_order() {
    let (tx, rx) = unbounded::<Task>();
    let context: Arc<dyn DispatchContext> = Arc::new(move |task: Task| {
        let _ = tx.send(task);
    });
    let list = Arc::new(BatchingCollection::<u32>::with_context(Vec::new(), Some(context)));
    let seen = record_added(&list);

    push_from_threads(&list, 4, 500);
    for task in rx.try_iter() {
        task();
    }

    let seen = seen.lock();
    assert_eq!(seen.len(), 2000);
    assert_eq!(descending_pairs(&seen), 0);
}

#[test]
fn test_mutation_waits_for_running_notification() {
    let list = Arc::new(BatchingCollection::<u32>::new());
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let recv = kinds.clone();
    let (entered_tx, entered_rx) = crossbeam_channel::bounded::<()>(0);
    let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(0);
    list.collection_changed().connect(move |change: &CollectionChange<u32>| {
        if matches!(change, CollectionChange::Added { .. }) {
            let _ = entered_tx.send(());
            let _ = release_rx.recv();
        }
        recv.lock().push(change.kind());
    });

    // Writer is parked inside its notification when the batch opens and closes.
    let writer = {
        let list = list.clone();
        thread::spawn(move || list.push(1))
    };
    entered_rx.recv().unwrap();
    list.begin_update();
    let closer = {
        let list = list.clone();
        thread::spawn(move || {
            list.clear();
            list.end_update().unwrap();
        })
    };
    thread::sleep(std::time::Duration::from_millis(20));
    release_tx.send(()).unwrap();
    writer.join().unwrap();
    closer.join().unwrap();

    assert_eq!(*kinds.lock(), vec!["added", "reset"]);
}
