use proptest::prelude::*;
use std::sync::Arc;
use storium_registry::{Registry, RegistryError};
use storium_types::{FileId, FileType, Identity, NewFile};

fn identity(byte: u8) -> Identity {
    Identity([byte; 20])
}

fn new_file(name: &str) -> NewFile {
    NewFile {
        file_name: name.to_string(),
        file_type: FileType::Other,
        content_hash: format!("hash-{}", name),
        file_size: 64,
        is_public: false,
        description: None,
        tags: vec![],
    }
}

/// One mutation in a generated workload. Identities are drawn from a small
/// universe so grants and revokes collide often.
#[derive(Debug, Clone)]
enum Op {
    Upload { owner: u8 },
    GrantAccount { grantor: u8, grantee: u8 },
    RevokeAccount { grantor: u8, grantee: u8 },
    GrantFile { actor: u8, file_index: usize, grantee: u8 },
    RevokeFile { actor: u8, file_index: usize, grantee: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..=4).prop_map(|owner| Op::Upload { owner }),
        (1u8..=4, 1u8..=4).prop_map(|(grantor, grantee)| Op::GrantAccount { grantor, grantee }),
        (1u8..=4, 1u8..=4).prop_map(|(grantor, grantee)| Op::RevokeAccount { grantor, grantee }),
        (1u8..=4, 0usize..8, 1u8..=4)
            .prop_map(|(actor, file_index, grantee)| Op::GrantFile { actor, file_index, grantee }),
        (1u8..=4, 0usize..8, 1u8..=4)
            .prop_map(|(actor, file_index, grantee)| Op::RevokeFile { actor, file_index, grantee }),
    ]
}

/// Apply a workload, tracking uploaded files so file ops target real IDs.
fn apply_ops(registry: &Registry, ops: &[Op]) -> Vec<(FileId, u8)> {
    let mut files: Vec<(FileId, u8)> = Vec::new();

    for op in ops {
        match op {
            Op::Upload { owner } => {
                let record = registry
                    .add_file(identity(*owner), new_file(&format!("f{}", files.len())))
                    .expect("upload of well-formed input succeeds");
                files.push((record.id, *owner));
            }
            Op::GrantAccount { grantor, grantee } => {
                let _ = registry.grant_account_access(identity(*grantor), identity(*grantee));
            }
            Op::RevokeAccount { grantor, grantee } => {
                let _ = registry.revoke_account_access(identity(*grantor), identity(*grantee));
            }
            Op::GrantFile {
                actor,
                file_index,
                grantee,
            } => {
                if let Some((file_id, _)) = files.get(*file_index) {
                    let _ = registry.grant_file_access(identity(*actor), *file_id, identity(*grantee));
                }
            }
            Op::RevokeFile {
                actor,
                file_index,
                grantee,
            } => {
                if let Some((file_id, _)) = files.get(*file_index) {
                    let _ =
                        registry.revoke_file_access(identity(*actor), *file_id, identity(*grantee));
                }
            }
        }
    }

    files
}

proptest! {
    /// The owner can read its own file no matter what grant churn happened.
    #[test]
    fn owner_access_survives_any_workload(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let registry = Registry::new();
        let files = apply_ops(&registry, &ops);

        for (file_id, owner) in &files {
            prop_assert!(registry.has_access(*file_id, identity(*owner)).unwrap());
        }
    }

    /// The predicate is exactly the OR of the two grant layers plus
    /// ownership, for every (file, principal) pair in the universe.
    #[test]
    fn predicate_matches_layer_composition(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let registry = Registry::new();
        let files = apply_ops(&registry, &ops);

        for (file_id, owner) in &files {
            for principal in 1u8..=4 {
                let requester = identity(principal);
                let is_owner = principal == *owner;
                let by_account = registry
                    .account_access_list(identity(*owner))
                    .iter()
                    .any(|row| row.grantee == requester && row.active);
                let by_file = registry.has_file_access(*file_id, requester).unwrap();

                let expected = is_owner || by_account || by_file;
                prop_assert_eq!(registry.has_access(*file_id, requester).unwrap(), expected);
            }
        }
    }

    /// Grant rows are tombstoned, never removed: the listing only grows.
    #[test]
    fn grant_history_only_grows(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let registry = Registry::new();
        let mut account_rows = 0usize;
        let mut file_rows = 0usize;

        for op in &ops {
            apply_ops(&registry, std::slice::from_ref(op));

            let account_now: usize = (1u8..=4)
                .map(|p| registry.account_access_list(identity(p)).len())
                .sum();
            let file_now: usize = (1u8..=4)
                .map(|p| registry.file_access_list(identity(p)).len())
                .sum();

            prop_assert!(account_now >= account_rows);
            prop_assert!(file_now >= file_rows);
            account_rows = account_now;
            file_rows = file_now;
        }
    }

    /// Self-grants fail regardless of surrounding state.
    #[test]
    fn self_grant_always_rejected(ops in prop::collection::vec(op_strategy(), 0..40), principal in 1u8..=4) {
        let registry = Registry::new();
        let files = apply_ops(&registry, &ops);

        let who = identity(principal);
        prop_assert!(matches!(
            registry.grant_account_access(who, who),
            Err(RegistryError::SelfGrant)
        ));

        if let Some((file_id, owner)) = files.first() {
            let owner_id = identity(*owner);
            prop_assert!(matches!(
                registry.grant_file_access(owner_id, *file_id, owner_id),
                Err(RegistryError::SelfGrant)
            ));
        }
    }
}

#[test]
fn workloads_share_one_registry_arc_across_threads() {
    // The registry is Send + Sync end to end.
    let registry: Arc<Registry> = Arc::new(Registry::new());
    let handle = {
        let registry = registry.clone();
        std::thread::spawn(move || {
            registry
                .add_file(identity(1), new_file("threaded"))
                .unwrap()
                .id
        })
    };
    let id = handle.join().unwrap();
    assert!(registry.has_access(id, identity(1)).unwrap());
}
