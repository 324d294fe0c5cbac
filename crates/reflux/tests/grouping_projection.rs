//! Calendar scenarios for the grouping projection: happenings grouped by day,
//! ordered by time, with "Hidden" happenings filtered out.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use reflux::{
    CollectionChange, CollectionError, GroupingProjection, NotifyPropertyChanged,
    ObservableCollection, OrderedCollectionMut, Property, PropertyChange, Shared, Signal,
};

struct Happening {
    time: Property<NaiveDateTime>,
    name: Property<String>,
    changed: Signal<PropertyChange>,
}

impl Happening {
    fn new(time: NaiveDateTime, name: &str) -> Shared<Self> {
        Shared::new(Self {
            time: Property::new(time),
            name: Property::new(name.to_string()),
            changed: Signal::new(),
        })
    }

    fn time(&self) -> NaiveDateTime {
        self.time.get()
    }

    fn name(&self) -> String {
        self.name.get()
    }

    fn set_time(&self, time: NaiveDateTime) {
        self.time.set_notify(time, &self.changed, "time");
    }

    fn set_name(&self, name: &str) {
        self.name.set_notify(name.to_string(), &self.changed, "name");
    }
}

impl NotifyPropertyChanged for Happening {
    fn property_changed(&self) -> Option<&Signal<PropertyChange>> {
        Some(&self.changed)
    }
}

impl fmt::Debug for Happening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

type Source = Arc<ObservableCollection<Shared<Happening>>>;
type Projection = GroupingProjection<NaiveDate, Happening>;
type GroupLog = Arc<Mutex<Vec<(&'static str, Option<NaiveDate>, usize)>>>;
type ItemLog = Arc<Mutex<Vec<CollectionChange<Shared<Happening>>>>>;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    date(2017, 1, day).and_hms_opt(hour, 0, 0).unwrap()
}

fn setup() -> (Source, Projection) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let source = Arc::new(ObservableCollection::from_vec(vec![
        Happening::new(at(1, 12), "HappeningDay1@12"),
        Happening::new(at(1, 14), "HappeningDay1@14"),
        Happening::new(at(1, 16), "HappeningDay1@16"),
        Happening::new(at(1, 10), "HappeningDay1@10"),
        Happening::new(at(1, 8), "HiddenDay1"),
        Happening::new(at(2, 12), "HappeningDay2@12"),
        Happening::new(at(2, 14), "HappeningDay2@14"),
        Happening::new(at(2, 16), "HappeningDay2@16"),
        Happening::new(at(2, 10), "HappeningDay2@10"),
        Happening::new(at(2, 8), "HiddenDay2"),
    ]));

    let projection = GroupingProjection::builder(source.clone(), |h: &Happening| h.time().date())
        .order_by(|h: &Happening| h.time())
        .filter(|h: &Happening| !h.name().starts_with("Hidden"))
        .build()
        .unwrap();

    (source, projection)
}

fn names(projection: &Projection, group: usize) -> Vec<String> {
    projection
        .get(group)
        .unwrap()
        .snapshot()
        .iter()
        .map(|h| h.name())
        .collect()
}

/// Records group-level changes as `(kind, key, items in group when raised)`.
fn record_groups(projection: &Projection) -> GroupLog {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recv = log.clone();
    projection.collection_changed().connect(move |change| {
        let entry = match change {
            CollectionChange::Added { item, .. } | CollectionChange::Removed { item, .. } => {
                (change.kind(), Some(*item.key()), item.len())
            }
            _ => (change.kind(), None, 0),
        };
        recv.lock().push(entry);
    });
    log
}

/// Records the item changes of the group at `index`.
fn record_items(projection: &Projection, index: usize) -> ItemLog {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recv = log.clone();
    projection
        .get(index)
        .unwrap()
        .collection_changed()
        .connect(move |change| recv.lock().push(change.clone()));
    log
}

#[test]
fn test_initial_grouping() {
    let (_source, projection) = setup();

    assert_eq!(projection.len(), 2);
    assert_eq!(
        names(&projection, 0),
        vec!["HappeningDay1@10", "HappeningDay1@12", "HappeningDay1@14", "HappeningDay1@16"]
    );
    assert_eq!(
        names(&projection, 1),
        vec!["HappeningDay2@10", "HappeningDay2@12", "HappeningDay2@14", "HappeningDay2@16"]
    );
}

#[test]
fn test_new_day_adds_group() {
    let (source, projection) = setup();
    let groups = record_groups(&projection);

    source.push(Happening::new(at(3, 12), "HappeningDay3@12"));

    assert_eq!(projection.len(), 3);
    assert_eq!(*projection.get(2).unwrap().key(), date(2017, 1, 3));
    assert_eq!(names(&projection, 2), vec!["HappeningDay3@12"]);
    assert_eq!(*groups.lock(), vec![("added", Some(date(2017, 1, 3)), 1)]);
}

#[test]
fn test_new_item_in_existing_day() {
    let (source, projection) = setup();
    let items = record_items(&projection, 1);
    let added = Happening::new(at(2, 18), "HappeningDay2@18");

    source.push(added.clone());

    assert_eq!(projection.len(), 2);
    assert_eq!(names(&projection, 1)[4], "HappeningDay2@18");
    assert_eq!(*items.lock(), vec![CollectionChange::Added { index: 4, item: added }]);
}

#[test]
fn test_remove_item() {
    let (source, projection) = setup();
    let items = record_items(&projection, 1);
    let last = projection.get(1).unwrap().items().get(3).unwrap();

    source.remove(&last);

    assert_eq!(projection.get(1).unwrap().len(), 3);
    assert_eq!(*items.lock(), vec![CollectionChange::Removed { index: 3, item: last }]);
}

#[test]
fn test_removing_last_item_removes_group() {
    let (source, projection) = setup();
    source.remove_at(7).unwrap();
    source.remove_at(6).unwrap();
    source.remove_at(5).unwrap();
    let group = projection.get(1).unwrap();
    assert_eq!(group.len(), 1);
    let only = group.items().get(0).unwrap();
    let groups = record_groups(&projection);

    source.remove(&only);

    assert_eq!(projection.len(), 1);
    assert_eq!(*groups.lock(), vec![("removed", Some(date(2017, 1, 2)), 1)]);
}

#[test]
fn test_time_change_to_new_day_moves_to_new_group() {
    let (_source, projection) = setup();
    let moving = projection.get(1).unwrap().items().get(3).unwrap();
    let items = record_items(&projection, 1);
    let groups = record_groups(&projection);

    moving.set_time(at(3, 12));

    assert_eq!(projection.len(), 3);
    assert_eq!(projection.get(0).unwrap().len(), 4);
    assert_eq!(projection.get(1).unwrap().len(), 3);
    assert_eq!(projection.get(2).unwrap().len(), 1);
    assert_eq!(
        *items.lock(),
        vec![CollectionChange::Removed { index: 3, item: moving }]
    );
    assert_eq!(*groups.lock(), vec![("added", Some(date(2017, 1, 3)), 1)]);
}

#[test]
fn test_time_change_to_other_day_moves_between_groups() {
    let (_source, projection) = setup();
    let moving = projection.get(0).unwrap().items().get(3).unwrap();
    let from = record_items(&projection, 0);
    let to = record_items(&projection, 1);

    moving.set_time(at(2, 18));

    assert_eq!(projection.len(), 2);
    assert_eq!(projection.get(0).unwrap().len(), 3);
    assert_eq!(projection.get(1).unwrap().len(), 5);
    assert_eq!(
        *from.lock(),
        vec![CollectionChange::Removed { index: 3, item: moving.clone() }]
    );
    assert_eq!(*to.lock(), vec![CollectionChange::Added { index: 4, item: moving }]);
}

#[test]
fn test_time_change_within_day_is_a_single_move() {
    let (source, projection) = setup();
    let moving = source.get(2).unwrap();
    let group = projection.get(0).unwrap();
    let items = record_items(&projection, 0);
    let tagged = Arc::new(Mutex::new(Vec::new()));
    let recv = tagged.clone();
    projection
        .group_items_changed()
        .connect(move |change| recv.lock().push((change.key, change.change.kind())));
    assert_eq!(group.items().index_of(&moving), Some(3));

    moving.set_time(at(1, 11));

    assert_eq!(group.items().index_of(&moving), Some(1));
    assert_eq!(
        *items.lock(),
        vec![CollectionChange::Moved {
            item: moving,
            old_index: 3,
            new_index: 1,
        }]
    );
    assert_eq!(*tagged.lock(), vec![(date(2017, 1, 1), "moved")]);
}

#[test]
fn test_new_item_lands_in_time_order() {
    let (source, projection) = setup();
    let added = Happening::new(at(1, 13), "HappeningDay1@13");

    source.push(added.clone());

    assert_eq!(projection.get(0).unwrap().items().index_of(&added), Some(2));
}

#[test]
fn test_earlier_day_becomes_first_group() {
    let (source, projection) = setup();
    let new_years_eve = date(2016, 12, 31);

    source.push(Happening::new(
        new_years_eve.and_hms_opt(12, 0, 0).unwrap(),
        "HappeningDay-1@12",
    ));

    assert_eq!(*projection.get(0).unwrap().key(), new_years_eve);
    assert_eq!(projection.position(&new_years_eve), Some(0));
}

#[test]
fn test_rename_into_filter_adds_item() {
    let (source, projection) = setup();
    let hidden = source.get(4).unwrap();
    let items = record_items(&projection, 0);
    assert!(!projection.get(0).unwrap().items().contains(&hidden));

    hidden.set_name("HappeningDay1@08");

    assert_eq!(projection.get(0).unwrap().items().index_of(&hidden), Some(0));
    assert_eq!(*items.lock(), vec![CollectionChange::Added { index: 0, item: hidden }]);
}

#[test]
fn test_rename_out_of_filter_removes_item() {
    let (source, projection) = setup();
    let visible = source.get(0).unwrap();
    let items = record_items(&projection, 0);
    assert_eq!(projection.get(0).unwrap().items().index_of(&visible), Some(1));

    visible.set_name("HiddenDay1@12");

    assert!(!projection.get(0).unwrap().items().contains(&visible));
    assert_eq!(*items.lock(), vec![CollectionChange::Removed { index: 1, item: visible }]);
}

#[test]
fn test_update_block_raises_single_reset() {
    let (source, projection) = setup();
    let groups = record_groups(&projection);

    projection.begin_update();
    source.push(Happening::new(at(3, 12), "HappeningDay3@12"));
    source.push(Happening::new(at(4, 12), "HappeningDay4@12"));
    source.remove_at(0).unwrap();
    assert!(groups.lock().is_empty());
    assert_eq!(projection.len(), 4);
    projection.end_update().unwrap();

    assert_eq!(*groups.lock(), vec![("reset", None, 0)]);
    assert_eq!(projection.end_update(), Err(CollectionError::UnmatchedEndUpdate));
}

#[test]
fn test_source_reset_resubscribes() {
    let (source, projection) = setup();
    let old = source.get(0).unwrap();
    let fresh = Happening::new(at(5, 9), "HappeningDay5@09");

    source.set_items(vec![fresh.clone()]);
    assert_eq!(projection.len(), 1);
    assert_eq!(old.changed.connection_count(), 0);

    fresh.set_time(at(6, 9));
    assert_eq!(*projection.get(0).unwrap().key(), date(2017, 1, 6));
}

#[test]
fn test_direct_mutation_is_not_supported() {
    let (_source, projection) = setup();
    let group = projection.get(0).unwrap();

    assert_eq!(
        projection.insert(0, group.clone()),
        Err(CollectionError::not_supported("insert"))
    );
    assert_eq!(
        projection.remove_at(0),
        Err(CollectionError::not_supported("remove_at"))
    );
    assert_eq!(projection.len(), 2);
}

#[test]
fn test_dispose_releases_everything() {
    let (source, projection) = setup();
    let item = source.get(0).unwrap();

    projection.dispose();
    item.set_time(at(9, 9));
    source.clear();

    assert_eq!(projection.len(), 2);
    assert_eq!(item.changed.connection_count(), 0);
    assert_eq!(source.collection_changed().connection_count(), 0);
}
