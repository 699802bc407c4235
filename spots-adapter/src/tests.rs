use crate::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spots::{
    Animation, Component, ComponentModel, Configuration, Controller, Item, Registry, Size,
};

const BOUNDS: Size = Size {
    width: 320.0,
    height: 200.0,
};

fn config(log: &SurfaceLog, deferred: &Rc<Cell<bool>>) -> Rc<Configuration> {
    Configuration::new()
        .with_registry(Registry::new().with_default_view(|| {
            Box::new(HeadlessView {
                last: None,
                default_height: 50.0,
            })
        }))
        .with_surface_factory(headless_surface_factory(log.clone(), deferred.clone()))
        .into_shared()
}

fn list(identifier: &str, count: usize) -> ComponentModel {
    ComponentModel::new("list")
        .with_identifier(identifier)
        .with_items((0..count).map(|i| Item::new(format!("{identifier}{i}"))).collect())
}

fn identifiers(controller: &Controller) -> Vec<String> {
    controller
        .components()
        .iter()
        .map(|c| c.model().identifier.clone().unwrap_or_default())
        .collect()
}

#[test]
fn cache_file_name_is_sha256_hex() {
    assert_eq!(
        cache_file_name("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_ne!(cache_file_name("home"), cache_file_name("profile"));
    assert_eq!(DEFAULT_EXPIRY, Duration::from_secs(259_200));
}

#[test]
fn memory_store_round_trips_and_expires() {
    let mut store = MemoryStore::new();
    store.save("k", b"hello", DEFAULT_EXPIRY).unwrap();
    assert_eq!(store.load("k").unwrap().as_deref(), Some(&b"hello"[..]));
    assert_eq!(store.load("missing").unwrap(), None);

    store.save("stale", b"old", Duration::ZERO).unwrap();
    assert_eq!(store.load("stale").unwrap(), None);
    assert_eq!(store.len(), 1);

    store.remove("k").unwrap();
    store.remove("k").unwrap();
    assert!(store.is_empty());
}

#[test]
fn file_store_round_trips_expires_and_rejects_corrupt_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("state")).unwrap();

    store.save("k", b"{\"a\":1}", DEFAULT_EXPIRY).unwrap();
    assert!(store.path_for("k").exists());
    assert_eq!(store.load("k").unwrap().as_deref(), Some(&b"{\"a\":1}"[..]));
    assert_eq!(store.load("missing").unwrap(), None);

    store.save("stale", b"old", Duration::ZERO).unwrap();
    assert_eq!(store.load("stale").unwrap(), None);
    assert!(!store.path_for("stale").exists());

    std::fs::write(store.path_for("short"), [1u8, 2, 3]).unwrap();
    assert!(matches!(store.load("short"), Err(CacheError::Corrupt(key)) if key == "short"));

    store.remove("k").unwrap();
    store.remove("k").unwrap();
    assert!(!store.path_for("k").exists());
}

#[test]
fn state_cache_stores_typed_values_under_hashed_name() {
    let mut cache = StateCache::new("home", MemoryStore::new());
    assert_eq!(cache.file_name(), cache_file_name("home"));
    assert_eq!(cache.load::<Vec<u32>>().unwrap(), None);

    cache.save(&vec![1u32, 2, 3]).unwrap();
    assert_eq!(cache.load::<Vec<u32>>().unwrap(), Some(vec![1, 2, 3]));
    assert!(matches!(cache.load::<String>(), Err(CacheError::Json(_))));

    cache.clear().unwrap();
    assert_eq!(cache.load::<Vec<u32>>().unwrap(), None);
}

#[test]
fn state_cache_models_honor_amount_of_items_to_cache() {
    let mut cache = StateCache::new("feed", MemoryStore::new());
    let model = list("feed", 5).with_amount_of_items_to_cache(2);
    cache.save_models(&[model]).unwrap();

    let models = cache.load_models().unwrap().unwrap();
    assert_eq!(models.len(), 1);
    let titles: Vec<&str> = models[0].items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["feed0", "feed1"]);
    assert_eq!(models[0].items[1].index, 1);
}

#[test]
fn component_hook_persists_model_after_mutations() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let cache = Rc::new(RefCell::new(StateCache::new("feed", MemoryStore::new())));

    let mut component = Component::new(list("feed", 2), config(&log, &deferred));
    component.setup(BOUNDS);
    component.set_cache_hook(component_cache_hook(cache.clone()));

    component.reload_if_needed(
        vec![Item::new("feed0"), Item::new("feed1")],
        Animation::Automatic,
        || {},
    );
    let stored: ComponentModel = cache.borrow_mut().load().unwrap().unwrap();
    assert_eq!(stored.items.len(), 2);

    component.append(Item::new("feed2"), Animation::Automatic, || {});
    let stored: ComponentModel = cache.borrow_mut().load().unwrap().unwrap();
    assert_eq!(stored.items.len(), 3);
    assert_eq!(stored.items[2].size.height, 50.0);
}

#[test]
fn anchor_preserves_position_when_component_is_inserted_above() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let mut controller = Controller::new(
        vec![list("a", 4), list("b", 4), list("c", 4)],
        config(&log, &deferred),
        BOUNDS,
    );
    controller.scroll_to(250.0);

    let anchor = capture_first_visible_anchor(&controller).unwrap();
    assert_eq!(anchor.key, AnchorKey::Identifier("b".to_owned()));
    assert_eq!(anchor.offset_in_viewport, 50.0);

    controller.reload_if_needed(
        vec![list("banner", 2), list("a", 4), list("b", 4), list("c", 4)],
        Animation::Automatic,
        || {},
    );
    assert_eq!(identifiers(&controller), ["banner", "a", "b", "c"]);

    assert!(apply_anchor(&mut controller, &anchor));
    assert_eq!(controller.scroll_view().content_offset(), 350.0);

    let gone = ScrollAnchor {
        key: AnchorKey::Identifier("missing".to_owned()),
        offset_in_viewport: 0.0,
    };
    assert!(!apply_anchor(&mut controller, &gone));
    assert!(!apply_anchor(
        &mut controller,
        &ScrollAnchor {
            key: AnchorKey::Index(9),
            offset_in_viewport: 0.0,
        }
    ));
}

#[test]
fn anchor_falls_back_to_index_without_identifier() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let model = ComponentModel::new("list").with_items(vec![Item::new("x"); 10]);
    let mut controller = Controller::new(vec![model], config(&log, &deferred), BOUNDS);
    controller.scroll_to(120.0);

    let anchor = capture_first_visible_anchor(&controller).unwrap();
    assert_eq!(anchor.key, AnchorKey::Index(0));
    assert_eq!(anchor.offset_in_viewport, 120.0);

    let empty = Controller::new(Vec::new(), config(&log, &deferred), BOUNDS);
    assert!(capture_first_visible_anchor(&empty).is_none());
}

#[test]
fn headless_surface_records_batches_and_configures() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let mut controller = Controller::new(vec![list("feed", 2)], config(&log, &deferred), BOUNDS);
    assert_eq!(log.events_for("feed"), vec![SurfaceEvent::ReloadData]);
    log.clear();

    controller.reload_if_needed(
        vec![ComponentModel::new("list")
            .with_identifier("feed")
            .with_items(vec![Item::new("feed0"), Item::new("renamed"), Item::new("feed2")])],
        Animation::Automatic,
        || {},
    );

    assert_eq!(
        log.events_for("feed"),
        vec![
            SurfaceEvent::BeginUpdates,
            SurfaceEvent::Insert(vec![2]),
            SurfaceEvent::EndUpdates,
            SurfaceEvent::Configure {
                index: 1,
                title: "renamed".to_owned()
            },
        ]
    );
    let frame = controller.scroll_view().layout_views()[0];
    assert_eq!(frame.height, 150.0);
}

#[test]
fn deferred_headless_surface_holds_completion_until_finished() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(true));
    let mut controller = Controller::new(vec![list("feed", 1)], config(&log, &deferred), BOUNDS);
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();

    controller.append(0, vec![Item::new("feed1")], Animation::Automatic, move || {
        f.set(true)
    });
    assert!(!fired.get());
    assert!(controller.components()[0].is_awaiting_surface());

    deferred.set(false);
    controller.surface_did_finish(0);
    assert!(fired.get());
    assert_eq!(controller.scroll_view().component_height(0), Some(100.0));
}

#[test]
fn cached_controller_falls_back_and_saves_after_reconcile() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let cache = StateCache::new("home", MemoryStore::new());
    let mut controller =
        CachedController::new(cache, vec![list("a", 1)], config(&log, &deferred), BOUNDS);
    assert_eq!(identifiers(controller.controller()), ["a"]);
    assert_eq!(controller.with_cache(|c| c.load_models().unwrap()), None);

    let fired = Rc::new(Cell::new(0));
    let f = fired.clone();
    controller.reload_if_needed(
        vec![list("a", 2), list("b", 1)],
        Animation::Automatic,
        move || f.set(f.get() + 1),
    );
    assert_eq!(fired.get(), 1);

    let stored = controller.with_cache(|c| c.load_models().unwrap()).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].items.len(), 2);

    controller.clear_cache().unwrap();
    assert_eq!(controller.with_cache(|c| c.load_models().unwrap()), None);
    controller.save().unwrap();
    assert!(controller.with_cache(|c| c.load_models().unwrap()).is_some());
}

#[test]
fn cached_controller_restores_cached_models() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let mut cache = StateCache::new("home", MemoryStore::new());
    cache.save_models(&[list("cached", 3)]).unwrap();

    let controller =
        CachedController::new(cache, vec![list("fallback", 1)], config(&log, &deferred), BOUNDS);
    assert_eq!(identifiers(controller.controller()), ["cached"]);
    assert_eq!(controller.controller().components()[0].items().len(), 3);
}

#[test]
fn cached_controller_ignores_unreadable_cache() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let mut cache = StateCache::new("home", MemoryStore::new());
    cache.save("not a payload").unwrap();

    let controller =
        CachedController::new(cache, vec![list("fallback", 1)], config(&log, &deferred), BOUNDS);
    assert_eq!(identifiers(controller.controller()), ["fallback"]);
}

#[test]
fn cached_controller_persists_to_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let store = FileStore::new(dir.path()).unwrap();
    let cache = StateCache::new("home", store);
    let path = cache.store().path_for(cache.file_name());

    let mut controller = CachedController::new(cache, Vec::new(), config(&log, &deferred), BOUNDS);
    controller
        .reload_if_needed_json(
            r#"{"components": [{"identifier": "grid", "items": [{"title": "A"}]}]}"#,
            Animation::Automatic,
            || {},
        )
        .unwrap();
    assert!(path.exists());
    assert_eq!(
        controller.controller().components()[0].kind(),
        &spots::ComponentKind::Grid
    );

    let reopened = StateCache::new("home", FileStore::new(dir.path()).unwrap());
    let restored = CachedController::new(reopened, Vec::new(), config(&log, &deferred), BOUNDS);
    assert_eq!(identifiers(restored.controller()), ["grid"]);
}

#[test]
fn anchored_reload_keeps_first_visible_component_in_place() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let cache = StateCache::new("home", MemoryStore::new());
    let mut controller = CachedController::new(
        cache,
        vec![list("a", 4), list("b", 6)],
        config(&log, &deferred),
        BOUNDS,
    );
    controller.controller_mut().scroll_to(250.0);

    let anchor = controller.reload_if_needed_anchored(
        vec![list("top", 1), list("a", 4), list("b", 6)],
        Animation::Automatic,
        || {},
    );
    assert_eq!(
        anchor.map(|a| a.key),
        Some(AnchorKey::Identifier("b".to_owned()))
    );
    assert_eq!(controller.controller().scroll_view().content_offset(), 300.0);
}

#[test]
fn anchored_reload_waits_for_deferred_surfaces() {
    let log = SurfaceLog::new();
    let deferred = Rc::new(Cell::new(false));
    let cache = StateCache::new("home", MemoryStore::new());
    let mut controller = CachedController::new(
        cache,
        vec![list("a", 4), list("b", 6)],
        config(&log, &deferred),
        BOUNDS,
    );
    controller.controller_mut().scroll_to(250.0);

    deferred.set(true);
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    let anchor = controller.reload_if_needed_anchored(
        vec![list("a", 6), list("b", 6)],
        Animation::Automatic,
        move || f.set(true),
    );
    assert_eq!(
        anchor.map(|a| a.key),
        Some(AnchorKey::Identifier("b".to_owned()))
    );
    assert!(!fired.get());
    assert!(controller.has_pending_anchor());
    assert_eq!(controller.controller().scroll_view().content_offset(), 250.0);

    deferred.set(false);
    controller.surface_did_finish(0);
    assert!(fired.get());
    assert!(!controller.has_pending_anchor());
    assert_eq!(controller.controller().scroll_view().component_start(1), Some(300.0));
    assert_eq!(controller.controller().scroll_view().content_offset(), 350.0);
}
