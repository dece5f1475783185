use lazytask_core::{EntityKind, EntityStore, ModelError, ReferenceSlot, RelationSlot};

fn owner_consistent(store: &mut EntityStore, task: lazytask_core::EntityKey) {
    for note in store.members(task, RelationSlot::TaskNotes).unwrap() {
        assert_eq!(
            store.reference(note, ReferenceSlot::NoteTask).unwrap(),
            Some(task)
        );
    }
}

#[test]
fn add_sets_child_reference() {
    let mut store = EntityStore::new();
    let task = store.create_task("write report").unwrap();
    let note = store.create_note("outline first").unwrap();

    store.add(task, RelationSlot::TaskNotes, note).unwrap();

    assert!(store.contains(task, RelationSlot::TaskNotes, note).unwrap());
    assert_eq!(
        store.reference(note, ReferenceSlot::NoteTask).unwrap(),
        Some(task)
    );
}

#[test]
fn add_twice_is_idempotent() {
    let mut store = EntityStore::new();
    let task = store.create_task("t").unwrap();
    let note = store.create_note("n").unwrap();

    store.add(task, RelationSlot::TaskNotes, note).unwrap();
    store.append(task, RelationSlot::TaskNotes, note).unwrap();

    assert_eq!(store.members(task, RelationSlot::TaskNotes).unwrap(), vec![note]);
}

#[test]
fn adding_to_new_owner_displaces_previous_owner() {
    let mut store = EntityStore::new();
    let first = store.create_task("first").unwrap();
    let second = store.create_task("second").unwrap();
    let attachment = store.create_attachment("plan.pdf").unwrap();

    store.add(first, RelationSlot::TaskAttachments, attachment).unwrap();
    store.add(second, RelationSlot::TaskAttachments, attachment).unwrap();

    assert!(store
        .members(first, RelationSlot::TaskAttachments)
        .unwrap()
        .is_empty());
    assert_eq!(
        store.members(second, RelationSlot::TaskAttachments).unwrap(),
        vec![attachment]
    );
    assert_eq!(
        store.reference(attachment, ReferenceSlot::AttachmentTask).unwrap(),
        Some(second)
    );
}

#[test]
fn setting_reference_moves_child_between_containers() {
    let mut store = EntityStore::new();
    let alice = store.create_user("alice").unwrap();
    let bob = store.create_user("bob").unwrap();
    let task = store.create_task("review").unwrap();

    store
        .set_reference(task, ReferenceSlot::TaskOwner, Some(alice))
        .unwrap();
    assert_eq!(store.members(alice, RelationSlot::UserTasks).unwrap(), vec![task]);

    store
        .set_reference(task, ReferenceSlot::TaskOwner, Some(bob))
        .unwrap();
    assert!(store.members(alice, RelationSlot::UserTasks).unwrap().is_empty());
    assert_eq!(store.members(bob, RelationSlot::UserTasks).unwrap(), vec![task]);

    store.set_reference(task, ReferenceSlot::TaskOwner, None).unwrap();
    assert!(store.members(bob, RelationSlot::UserTasks).unwrap().is_empty());
    assert_eq!(store.reference(task, ReferenceSlot::TaskOwner).unwrap(), None);
}

#[test]
fn discard_clears_reference_and_ignores_absent_items() {
    let mut store = EntityStore::new();
    let task = store.create_task("t").unwrap();
    let kept = store.create_note("kept").unwrap();
    let dropped = store.create_note("dropped").unwrap();
    let stranger = store.create_note("stranger").unwrap();
    store.add(task, RelationSlot::TaskNotes, kept).unwrap();
    store.add(task, RelationSlot::TaskNotes, dropped).unwrap();

    store.discard(task, RelationSlot::TaskNotes, dropped).unwrap();
    store.discard(task, RelationSlot::TaskNotes, stranger).unwrap();

    assert_eq!(store.members(task, RelationSlot::TaskNotes).unwrap(), vec![kept]);
    assert_eq!(store.reference(dropped, ReferenceSlot::NoteTask).unwrap(), None);
    owner_consistent(&mut store, task);
}

#[test]
fn strict_remove_fails_for_absent_item() {
    let mut store = EntityStore::new();
    let task = store.create_task("t").unwrap();
    let note = store.create_note("n").unwrap();

    let err = store
        .remove(task, RelationSlot::TaskNotes, note)
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::NotFound {
            slot: RelationSlot::TaskNotes,
            item: note,
        }
    );

    store.add(task, RelationSlot::TaskNotes, note).unwrap();
    store.remove(task, RelationSlot::TaskNotes, note).unwrap();
    assert_eq!(store.reference(note, ReferenceSlot::NoteTask).unwrap(), None);
}

#[test]
fn item_of_wrong_kind_is_a_configuration_error() {
    let mut store = EntityStore::new();
    let task = store.create_task("t").unwrap();
    let tag = store.create_tag("urgent").unwrap();

    let err = store.add(task, RelationSlot::TaskNotes, tag).unwrap_err();
    assert_eq!(
        err,
        ModelError::MissingCounterpart {
            slot: "note.task",
            kind: EntityKind::Tag,
        }
    );
    assert!(store.members(task, RelationSlot::TaskNotes).unwrap().is_empty());

    let err = store
        .set_reference(tag, ReferenceSlot::NoteTask, Some(task))
        .unwrap_err();
    assert!(matches!(err, ModelError::MissingCounterpart { .. }));
}

#[test]
fn invariant_holds_across_mixed_entry_points() {
    let mut store = EntityStore::new();
    let tasks: Vec<_> = (0..3)
        .map(|idx| store.create_task(format!("task {idx}")).unwrap())
        .collect();
    let notes: Vec<_> = (0..5)
        .map(|idx| store.create_note(format!("note {idx}")).unwrap())
        .collect();

    for (idx, note) in notes.iter().enumerate() {
        let owner = tasks[idx % tasks.len()];
        if idx % 2 == 0 {
            store.add(owner, RelationSlot::TaskNotes, *note).unwrap();
        } else {
            store
                .set_reference(*note, ReferenceSlot::NoteTask, Some(owner))
                .unwrap();
        }
    }
    store
        .set_reference(notes[0], ReferenceSlot::NoteTask, Some(tasks[2]))
        .unwrap();
    store.discard(tasks[1], RelationSlot::TaskNotes, notes[4]).unwrap();
    store.add(tasks[0], RelationSlot::TaskNotes, notes[1]).unwrap();

    for task in &tasks {
        owner_consistent(&mut store, *task);
    }
    for note in &notes {
        if let Some(owner) = store.reference(*note, ReferenceSlot::NoteTask).unwrap() {
            assert!(store.contains(owner, RelationSlot::TaskNotes, *note).unwrap());
        }
    }
    assert_eq!(store.reference(notes[4], ReferenceSlot::NoteTask).unwrap(), None);
}
