//! # Library Persistence
//!
//! Saved templates survive reopening the library file, and a damaged file
//! is reported instead of silently discarded.

use pretty_assertions::assert_eq;
use std::fs;
use tapecraft::TapecraftError;
use tapecraft::library::{JsonFileStore, TemplateLibrary};
use tapecraft::template::Template;
use tempfile::TempDir;

fn open(dir: &TempDir) -> TemplateLibrary<JsonFileStore> {
    TemplateLibrary::open(JsonFileStore::new(dir.path().join("templates.json"))).unwrap()
}

#[test]
fn saved_templates_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let cable = Template::from_starter("cable").unwrap();
    let device = Template::from_starter("device").unwrap();

    {
        let mut lib = open(&dir);
        assert_eq!(lib.save("Rack A", cable.elements()).unwrap(), 0);
        assert_eq!(lib.save("SRV-01", device.elements()).unwrap(), 1);
    }

    let lib = open(&dir);
    let names: Vec<_> = lib.list().map(|(i, n)| (i, n.to_string())).collect();
    assert_eq!(
        names,
        vec![(0, "Rack A".to_string()), (1, "SRV-01".to_string())]
    );

    let mut live = Template::new();
    assert!(lib.load(1, &mut live));
    assert_eq!(live.elements(), device.elements());
}

#[test]
fn remove_is_persisted() {
    let dir = TempDir::new().unwrap();
    let text = Template::from_starter("text").unwrap();
    {
        let mut lib = open(&dir);
        lib.save("one", text.elements()).unwrap();
        lib.save("two", text.elements()).unwrap();
        let removed = lib.remove(0).unwrap().unwrap();
        assert_eq!(removed.name, "one");
    }
    let lib = open(&dir);
    assert_eq!(lib.len(), 1);
    assert_eq!(lib.get(0).unwrap().name, "two");
}

#[test]
fn missing_directory_is_created_on_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("library.json");
    let mut lib = TemplateLibrary::open(JsonFileStore::new(&path)).unwrap();
    assert!(lib.is_empty());
    lib.save("x", Template::from_starter("text").unwrap().elements())
        .unwrap();
    assert!(path.exists());
}

#[test]
fn corrupt_file_is_a_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("templates.json");
    fs::write(&path, "{ not json").unwrap();

    let err = TemplateLibrary::open(JsonFileStore::new(&path))
        .err()
        .unwrap();
    assert!(matches!(err, TapecraftError::Format(_)));
    // The damaged file is left for the user to inspect.
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}
