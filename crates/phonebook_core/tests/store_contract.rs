use phonebook_core::{
    open_store, Character, CharacterStore, JsonCharacterStore, Notes, SqliteCharacterStore,
    StorageConfig, StoreError, PLACEHOLDER_IMAGE,
};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn sqlite_store() -> (TempDir, SqliteCharacterStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteCharacterStore::open(dir.path().join("phonebook.db")).unwrap();
    (dir, store)
}

fn json_store() -> (TempDir, JsonCharacterStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonCharacterStore::open(dir.path().join("data")).unwrap();
    (dir, store)
}

fn character(id: &str, name: &str) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        role: "Townsfolk".to_string(),
        bio: format!("{name} lives in town."),
        image: PLACEHOLDER_IMAGE.to_string(),
        available: false,
    }
}

fn ids(characters: &[Character]) -> Vec<&str> {
    characters.iter().map(|c| c.id.as_str()).collect()
}

fn available_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn check_insert_and_lookup(store: &dyn CharacterStore) {
    let hal = character("hal_bogle", "Hal Bogle");
    assert!(!store.character_exists("hal_bogle").unwrap());
    store.insert_character(&hal).unwrap();

    assert!(store.character_exists("hal_bogle").unwrap());
    assert_eq!(store.get_character("hal_bogle").unwrap(), Some(hal));
    assert_eq!(store.get_character("nobody").unwrap(), None);
}

fn check_duplicate_id_is_rejected(store: &dyn CharacterStore) {
    store
        .insert_character(&character("molly_hopper", "Molly Hopper"))
        .unwrap();
    let err = store
        .insert_character(&character("molly_hopper", "Someone Else"))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId(id) if id == "molly_hopper"));

    let stored = store.load_characters().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Molly Hopper");
}

fn check_availability_replace(store: &dyn CharacterStore) {
    for (id, name) in [
        ("luiz_adams", "Luiz Adams"),
        ("hal_bogle", "Hal Bogle"),
        ("vic_pollard", "Vic Pollard"),
    ] {
        store.insert_character(&character(id, name)).unwrap();
    }

    store
        .set_availability(&available_set(&["hal_bogle", "vic_pollard", "ghost"]))
        .unwrap();
    let flags: Vec<(String, bool)> = store
        .load_characters()
        .unwrap()
        .into_iter()
        .map(|c| (c.id, c.available))
        .collect();
    assert!(flags.contains(&("hal_bogle".to_string(), true)));
    assert!(flags.contains(&("vic_pollard".to_string(), true)));
    assert!(flags.contains(&("luiz_adams".to_string(), false)));
    assert_eq!(flags.len(), 3);

    store.set_availability(&BTreeSet::new()).unwrap();
    assert!(store
        .load_characters()
        .unwrap()
        .iter()
        .all(|c| !c.available));
}

fn check_availability_accepts_large_id_sets(store: &dyn CharacterStore) {
    store
        .insert_character(&character("hal_bogle", "Hal Bogle"))
        .unwrap();
    store
        .insert_character(&character("vic_pollard", "Vic Pollard"))
        .unwrap();

    let mut chosen: BTreeSet<String> = (0..40_000).map(|idx| format!("ghost_{idx}")).collect();
    chosen.insert("hal_bogle".to_string());
    store.set_availability(&chosen).unwrap();

    assert!(store.get_character("hal_bogle").unwrap().unwrap().available);
    assert!(!store.get_character("vic_pollard").unwrap().unwrap().available);
    assert_eq!(store.load_characters().unwrap().len(), 2);
}

fn check_single_availability(store: &dyn CharacterStore) {
    store
        .insert_character(&character("marcus_hensley", "Marcus Hensley"))
        .unwrap();

    store
        .set_character_availability("marcus_hensley", true)
        .unwrap();
    assert!(store.get_character("marcus_hensley").unwrap().unwrap().available);

    store
        .set_character_availability("marcus_hensley", false)
        .unwrap();
    assert!(!store.get_character("marcus_hensley").unwrap().unwrap().available);

    let err = store.set_character_availability("nobody", true).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "nobody"));
}

fn check_notes_default_and_overwrite(store: &dyn CharacterStore) {
    assert_eq!(store.load_notes().unwrap(), Notes::default());

    store.save_notes(&Notes::new("a", "b", "c")).unwrap();
    assert_eq!(store.load_notes().unwrap(), Notes::new("a", "b", "c"));

    store
        .save_notes(&Notes::new("cult in the mine", "", ""))
        .unwrap();
    assert_eq!(
        store.load_notes().unwrap(),
        Notes::new("cult in the mine", "", "")
    );
}

#[test]
fn sqlite_insert_and_lookup() {
    let (_dir, store) = sqlite_store();
    check_insert_and_lookup(&store);
}

#[test]
fn json_insert_and_lookup() {
    let (_dir, store) = json_store();
    check_insert_and_lookup(&store);
}

#[test]
fn sqlite_rejects_duplicate_id() {
    let (_dir, store) = sqlite_store();
    check_duplicate_id_is_rejected(&store);
}

#[test]
fn json_rejects_duplicate_id() {
    let (_dir, store) = json_store();
    check_duplicate_id_is_rejected(&store);
}

#[test]
fn sqlite_availability_is_full_replace() {
    let (_dir, store) = sqlite_store();
    check_availability_replace(&store);
}

#[test]
fn json_availability_is_full_replace() {
    let (_dir, store) = json_store();
    check_availability_replace(&store);
}

#[test]
fn sqlite_availability_accepts_large_id_sets() {
    let (_dir, store) = sqlite_store();
    check_availability_accepts_large_id_sets(&store);
}

#[test]
fn json_availability_accepts_large_id_sets() {
    let (_dir, store) = json_store();
    check_availability_accepts_large_id_sets(&store);
}

#[test]
fn sqlite_single_character_availability() {
    let (_dir, store) = sqlite_store();
    check_single_availability(&store);
}

#[test]
fn json_single_character_availability() {
    let (_dir, store) = json_store();
    check_single_availability(&store);
}

#[test]
fn sqlite_notes_default_and_overwrite() {
    let (_dir, store) = sqlite_store();
    check_notes_default_and_overwrite(&store);
}

#[test]
fn json_notes_default_and_overwrite() {
    let (_dir, store) = json_store();
    check_notes_default_and_overwrite(&store);
}

#[test]
fn sqlite_lists_by_name_then_id() {
    let (_dir, store) = sqlite_store();
    store
        .insert_character(&character("vic_pollard", "Vic Pollard"))
        .unwrap();
    store
        .insert_character(&character("hal_bogle_2", "Hal Bogle"))
        .unwrap();
    store
        .insert_character(&character("hal_bogle", "Hal Bogle"))
        .unwrap();
    store
        .insert_character(&character("dorris_macintosh", "Dorris Macintosh"))
        .unwrap();

    let listed = store.load_characters().unwrap();
    assert_eq!(
        ids(&listed),
        vec!["dorris_macintosh", "hal_bogle", "hal_bogle_2", "vic_pollard"]
    );
}

#[test]
fn sqlite_name_ordering_ignores_case() {
    let (_dir, store) = sqlite_store();
    store.insert_character(&character("zed", "Zed")).unwrap();
    store.insert_character(&character("adam", "adam")).unwrap();
    store.insert_character(&character("molly", "Molly")).unwrap();

    let listed = store.load_characters().unwrap();
    assert_eq!(ids(&listed), vec!["adam", "molly", "zed"]);
}

#[test]
fn json_lists_in_insertion_order() {
    let (_dir, store) = json_store();
    for (id, name) in [
        ("vic_pollard", "Vic Pollard"),
        ("dorris_macintosh", "Dorris Macintosh"),
        ("hal_bogle", "Hal Bogle"),
    ] {
        store.insert_character(&character(id, name)).unwrap();
    }

    let listed = store.load_characters().unwrap();
    assert_eq!(ids(&listed), vec!["vic_pollard", "dorris_macintosh", "hal_bogle"]);
}

#[test]
fn json_files_use_documented_keys() {
    let (_dir, store) = json_store();
    store
        .insert_character(&character("hal_bogle", "Hal Bogle"))
        .unwrap();
    store.save_notes(&Notes::new("h", "p", "m")).unwrap();

    let raw_characters: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.characters_path()).unwrap()).unwrap();
    let record = raw_characters[0].as_object().unwrap();
    let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["available", "bio", "id", "image", "name", "role"]);

    let raw_notes: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.notes_path()).unwrap()).unwrap();
    assert_eq!(raw_notes["hooks"], "h");
    assert_eq!(raw_notes["previous_session"], "p");
    assert_eq!(raw_notes["misc"], "m");
}

#[test]
fn sqlite_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.db");
    {
        let store = SqliteCharacterStore::open(&path).unwrap();
        store
            .insert_character(&character("hal_bogle", "Hal Bogle"))
            .unwrap();
        store.save_notes(&Notes::new("a", "b", "c")).unwrap();
    }

    let reopened = SqliteCharacterStore::open(&path).unwrap();
    assert!(reopened.character_exists("hal_bogle").unwrap());
    assert_eq!(reopened.load_notes().unwrap(), Notes::new("a", "b", "c"));
}

#[test]
fn json_reopen_keeps_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = JsonCharacterStore::open(dir.path()).unwrap();
        store
            .insert_character(&character("hal_bogle", "Hal Bogle"))
            .unwrap();
    }

    let reopened = JsonCharacterStore::open(dir.path()).unwrap();
    assert_eq!(ids(&reopened.load_characters().unwrap()), vec!["hal_bogle"]);
}

#[test]
fn open_store_selects_backend_from_config() {
    let dir = tempfile::tempdir().unwrap();

    let sqlite_config = StorageConfig::Sqlite {
        path: dir.path().join("phonebook.db"),
    };
    let sqlite = open_store(&sqlite_config).unwrap();
    sqlite
        .insert_character(&character("hal_bogle", "Hal Bogle"))
        .unwrap();
    assert!(dir.path().join("phonebook.db").exists());

    let json_config = StorageConfig::JsonFiles {
        data_dir: dir.path().join("json"),
    };
    let json = open_store(&json_config).unwrap();
    assert!(json.load_characters().unwrap().is_empty());
    assert!(dir.path().join("json").join("characters.json").exists());
}
