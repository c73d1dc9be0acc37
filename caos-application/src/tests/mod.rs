pub mod prelude {
    use std::cell::RefCell;

    use anyhow::{anyhow, Result as Fallible};
    use serde_json::Value;

    pub use caos_core::{
        entities::{
            jid::*, metadata::*, narrative::*, notification::*, period::*, proposal::*,
            social::*, status::*, user::*, world::*,
        },
        gateways::{images::ImageStorage, llm::LoreGenerator},
        repositories::*,
        usecases,
    };

    pub use crate::{error::AppError, prelude as flows};

    pub mod mem {
        pub use caos_db_mem::Connections;
    }

    pub struct DummyStorage {
        files: RefCell<Vec<(JId, String, bool)>>,
    }

    impl Default for DummyStorage {
        fn default() -> Self {
            Self {
                files: RefCell::new(Vec::new()),
            }
        }
    }

    impl DummyStorage {
        pub fn seed(&self, world: &JId, filename: &str) {
            self.files
                .borrow_mut()
                .push((world.clone(), filename.to_owned(), false));
        }

        pub fn trashed(&self, world: &JId) -> Vec<String> {
            self.files
                .borrow()
                .iter()
                .filter(|(w, _, trashed)| w == world && *trashed)
                .map(|(_, f, _)| f.clone())
                .collect()
        }
    }

    impl ImageStorage for DummyStorage {
        fn store(&self, world: &JId, filename: &str, _blob_ref: &str) -> Fallible<()> {
            self.seed(world, filename);
            Ok(())
        }

        fn move_to_trash(&self, world: &JId, filename: &str) -> Fallible<()> {
            let mut files = self.files.borrow_mut();
            let slot = files
                .iter_mut()
                .find(|(w, f, trashed)| w == world && f == filename && !trashed)
                .ok_or_else(|| anyhow!("no such file"))?;
            slot.2 = true;
            Ok(())
        }

        fn restore_from_trash(&self, world: &JId, filename: &str) -> Fallible<()> {
            let mut files = self.files.borrow_mut();
            let slot = files
                .iter_mut()
                .find(|(w, f, trashed)| w == world && f == filename && *trashed)
                .ok_or_else(|| anyhow!("not in trash"))?;
            slot.2 = false;
            Ok(())
        }

        fn list_images(&self, world: &JId) -> Fallible<Vec<String>> {
            Ok(self
                .files
                .borrow()
                .iter()
                .filter(|(w, _, trashed)| w == world && !trashed)
                .map(|(_, f, _)| f.clone())
                .collect())
        }
    }

    #[derive(Default)]
    pub struct DummyLore;

    impl LoreGenerator for DummyLore {
        fn edit_text(&self, _: &str, _: &str, _: f32, _: u32) -> Fallible<String> {
            Err(anyhow!("no LLM in tests"))
        }

        fn generate_structure(&self, _: &str, _: &str) -> Fallible<Value> {
            Err(anyhow!("no LLM in tests"))
        }

        fn extract_metadata(&self, _: &str) -> Fallible<Value> {
            Err(anyhow!("no LLM in tests"))
        }
    }

    pub struct BackendFixture {
        pub connections: mem::Connections,
        pub storage: DummyStorage,
        pub ai: DummyLore,
    }

    impl BackendFixture {
        pub fn new() -> Self {
            Self {
                connections: mem::Connections::init().unwrap(),
                storage: DummyStorage::default(),
                ai: DummyLore,
            }
        }

        pub fn seed_user(&self, name: &str, rank: Rank) -> User {
            let user = User::new(name, rank);
            self.connections
                .exclusive()
                .unwrap()
                .create_user(&user)
                .unwrap();
            user
        }

        pub fn seed_superuser(&self, name: &str) -> User {
            let mut user = User::new(name, Rank::Superadmin);
            user.superuser = true;
            self.connections
                .exclusive()
                .unwrap()
                .create_user(&user)
                .unwrap();
            user
        }

        pub fn seed_minion(&self, name: &str, boss: &str) -> User {
            let mut user = User::new(name, Rank::Subadmin);
            user.bosses.push(boss.into());
            self.connections
                .exclusive()
                .unwrap()
                .create_user(&user)
                .unwrap();
            user
        }

        pub fn seed_world(&self, id: &str, name: &str, desc: &str, author: &str) -> World {
            let mut world = World::new(id.parse().unwrap(), name, Some(author.into()));
            world.description = desc.to_owned();
            world.status = WorldStatus::Live;
            self.connections
                .exclusive()
                .unwrap()
                .create_world(world.clone())
                .unwrap();
            world
        }

        pub fn world(&self, id: &str) -> World {
            self.connections
                .shared()
                .unwrap()
                .get_world(&id.parse().unwrap())
                .unwrap()
        }

        pub fn world_proposals(&self, id: &str) -> Vec<WorldProposal> {
            self.connections
                .shared()
                .unwrap()
                .world_proposals_of(&id.parse().unwrap())
                .unwrap()
        }

        pub fn inbox(&self, user: &str) -> Vec<Notification> {
            self.connections
                .shared()
                .unwrap()
                .notifications_of(&user.into())
                .unwrap()
        }
    }
}

mod scenarios {
    use super::prelude::*;

    /// Edit + approve + publish applies the payload, supplants the
    /// previous LIVE and notifies the author.
    #[test]
    fn edit_approve_publish() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        let author = fixture.seed_minion("autor", "owner");
        fixture.seed_world("0101", "Alpha", "d0", "owner");

        let proposal = flows::propose_world_change(
            &fixture.connections,
            &author,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "Beta".into(),
                proposed_description: "d1".into(),
                metadata: None,
                change_log: "mejoras".into(),
            },
        )
        .unwrap();

        flows::approve_world_version(&fixture.connections, &owner, proposal.id).unwrap();
        let outcome =
            flows::publish_world_version(&fixture.connections, &owner, proposal.id).unwrap();

        assert_eq!(outcome.world.name, "Beta");
        assert_eq!(outcome.world.description, "d1");
        assert_eq!(
            outcome.world.current_version_number,
            outcome.proposal.version_number
        );
        assert_eq!(outcome.proposal.status, ProposalStatus::Live);

        let titles: Vec<String> = fixture
            .inbox("autor")
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert!(titles.contains(&"🚀 ¡Mundo Publicado!".to_owned()));

        // Supplanting a second time demotes the first to HISTORY.
        let second = flows::propose_world_change(
            &fixture.connections,
            &author,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "Gamma".into(),
                proposed_description: "d2".into(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();
        flows::approve_world_version(&fixture.connections, &owner, second.id).unwrap();
        flows::publish_world_version(&fixture.connections, &owner, second.id).unwrap();

        let statuses: Vec<ProposalStatus> = fixture
            .world_proposals("0101")
            .into_iter()
            .map(|p| p.status)
            .collect();
        assert_eq!(
            statuses
                .iter()
                .filter(|s| **s == ProposalStatus::Live)
                .count(),
            1
        );
        assert!(statuses.contains(&ProposalStatus::History));
    }

    /// A timeline snapshot lives in its own track and never touches
    /// the LIVE name or description.
    #[test]
    fn timeline_snapshot_track() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        fixture.seed_world("0101", "Alpha", "d0", "owner");

        let mut snapshot_meta = Metadata::new();
        snapshot_meta.insert("population", serde_json::json!("10000"));
        let proposal = flows::propose_timeline_snapshot(
            &fixture.connections,
            &owner,
            usecases::NewTimelineSnapshot {
                world: "0101".parse().unwrap(),
                year: 1500,
                snapshot: TimelineSnapshot {
                    description: "fell".into(),
                    metadata: snapshot_meta,
                    ..Default::default()
                },
                change_log: String::new(),
            },
        )
        .unwrap();
        assert_eq!(proposal.status, ProposalStatus::Pending);
        assert_eq!(proposal.change_type, ChangeType::Timeline);

        // Listing pending TIMELINE proposals returns exactly this one.
        let pending = fixture
            .connections
            .shared()
            .unwrap()
            .query_world_proposals(&ProposalQuery {
                status: vec![ProposalStatus::Pending],
                change_type: Some(ChangeType::Timeline),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, proposal.id);

        flows::approve_world_version(&fixture.connections, &owner, proposal.id).unwrap();
        flows::publish_world_version(&fixture.connections, &owner, proposal.id).unwrap();

        let world = fixture.world("0101");
        assert_eq!(world.name, "Alpha");
        assert_eq!(world.description, "d0");
        assert_eq!(
            world.metadata.timeline_snapshot(1500).unwrap().description,
            "fell"
        );
        assert_eq!(world.metadata.current_year(), Some(1500));
    }

    /// Territorial silo over the dashboard.
    #[test]
    fn territorial_silo() {
        let fixture = BackendFixture::new();
        let admin1 = fixture.seed_user("admin1", Rank::Admin);
        let minion = fixture.seed_minion("minion", "admin1");
        let superuser = fixture.seed_superuser("super");
        fixture.seed_world("0101", "W1", "", "admin1");
        fixture.seed_world("0102", "W2", "", "super");

        let p_w1 = flows::propose_world_change(
            &fixture.connections,
            &minion,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "W1'".into(),
                proposed_description: String::new(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();
        let p_w2 = flows::propose_world_change(
            &fixture.connections,
            &minion,
            usecases::NewWorldChange {
                world: "0102".parse().unwrap(),
                proposed_name: "W2'".into(),
                proposed_description: String::new(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();

        let board = flows::dashboard(
            &fixture.connections,
            &admin1,
            &usecases::DashboardFilters::default(),
        )
        .unwrap();
        let ids: Vec<ProposalId> = board
            .worlds
            .pending
            .iter()
            .map(|i| i.proposal_id)
            .collect();
        assert!(ids.contains(&p_w1.id));
        assert!(!ids.contains(&p_w2.id));

        let super_board = flows::dashboard(
            &fixture.connections,
            &superuser,
            &usecases::DashboardFilters::default(),
        )
        .unwrap();
        let super_ids: Vec<ProposalId> = super_board
            .worlds
            .pending
            .iter()
            .map(|i| i.proposal_id)
            .collect();
        assert!(super_ids.contains(&p_w1.id));
        assert!(super_ids.contains(&p_w2.id));
    }

    /// Rejection keeps the reviewer's feedback and notifies the author
    /// with the reason.
    #[test]
    fn reject_with_feedback() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        let author = fixture.seed_minion("autor", "owner");
        fixture.seed_world("0101", "Alpha", "d0", "owner");

        let proposal = flows::propose_world_change(
            &fixture.connections,
            &author,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "Beta".into(),
                proposed_description: String::new(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();

        let rejected = flows::reject_world_version(
            &fixture.connections,
            &owner,
            proposal.id,
            Some("inconsistent with lore".into()),
        )
        .unwrap();
        assert_eq!(rejected.status, ProposalStatus::Rejected);
        assert_eq!(
            rejected.admin_feedback.as_deref(),
            Some("inconsistent with lore")
        );
        assert_eq!(rejected.reviewer, Some("owner".into()));

        let inbox = fixture.inbox("autor");
        assert!(inbox
            .iter()
            .any(|n| n.message.contains("inconsistent with lore")));
    }

    /// Image delete publish moves the file to the per-world trash and the
    /// restore brings it back.
    #[test]
    fn image_delete_roundtrip() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        fixture.seed_world("0101", "Alpha", "d0", "owner");
        let jid: JId = "0101".parse().unwrap();
        fixture.storage.seed(&jid, "vista.png");

        let proposal = flows::propose_image_change(
            &fixture.connections,
            &owner,
            usecases::NewImageProposal {
                world: jid.clone(),
                action: ImageAction::Delete,
                image_blob_ref: None,
                target_filename: "vista.png".into(),
                title: "Vista".into(),
                reason: String::new(),
                timeline_period: None,
            },
        )
        .unwrap();
        flows::approve_image_proposal(&fixture.connections, &owner, proposal.id).unwrap();
        flows::publish_image_proposal(&fixture.connections, &fixture.storage, &owner, proposal.id)
            .unwrap();
        assert_eq!(fixture.storage.trashed(&jid), vec!["vista.png"]);

        flows::restore_image_proposal(&fixture.connections, &fixture.storage, &owner, proposal.id)
            .unwrap();
        assert!(fixture.storage.trashed(&jid).is_empty());
    }

    /// A failed publish rolls back: the prior LIVE stays in place.
    #[test]
    fn failed_publish_leaves_live_untouched() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        fixture.seed_world("0101", "Alpha", "d0", "owner");

        let proposal = flows::propose_world_change(
            &fixture.connections,
            &owner,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "Beta".into(),
                proposed_description: String::new(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();
        // Not approved: the publish must fail and change nothing.
        let err = flows::publish_world_version(&fixture.connections, &owner, proposal.id);
        assert!(err.is_err());
        let world = fixture.world("0101");
        assert_eq!(world.name, "Alpha");
        assert_eq!(
            fixture
                .world_proposals("0101")
                .into_iter()
                .find(|p| p.id == proposal.id)
                .unwrap()
                .status,
            ProposalStatus::Pending
        );
    }

    /// Property 7: restoring twice yields two distinct PENDING clones and
    /// the origin stays archived.
    #[test]
    fn restore_clone_idempotence() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        fixture.seed_world("0101", "Alpha", "d0", "owner");

        let proposal = flows::propose_world_change(
            &fixture.connections,
            &owner,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "Beta".into(),
                proposed_description: "d1".into(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();
        flows::archive_world_version(&fixture.connections, &owner, proposal.id).unwrap();

        let clone1 =
            flows::restore_world_version(&fixture.connections, &owner, proposal.id).unwrap();
        let clone2 =
            flows::restore_world_version(&fixture.connections, &owner, proposal.id).unwrap();
        assert_ne!(clone1.id, clone2.id);
        for clone in [&clone1, &clone2] {
            assert_eq!(clone.status, ProposalStatus::Pending);
            assert_eq!(clone.proposed_name, "Beta");
            assert_eq!(clone.proposed_description, "d1");
        }
        assert_eq!(
            fixture
                .world_proposals("0101")
                .into_iter()
                .find(|p| p.id == proposal.id)
                .unwrap()
                .status,
            ProposalStatus::Archived
        );
    }

    /// Property 2: version numbers grow with creation order across tracks.
    #[test]
    fn version_numbers_are_monotonic() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        fixture.seed_world("0101", "Alpha", "d0", "owner");

        let live = flows::propose_world_change(
            &fixture.connections,
            &owner,
            usecases::NewWorldChange {
                world: "0101".parse().unwrap(),
                proposed_name: "Beta".into(),
                proposed_description: String::new(),
                metadata: None,
                change_log: String::new(),
            },
        )
        .unwrap();
        let timeline = flows::propose_timeline_snapshot(
            &fixture.connections,
            &owner,
            usecases::NewTimelineSnapshot {
                world: "0101".parse().unwrap(),
                year: 1500,
                snapshot: TimelineSnapshot {
                    description: "fell".into(),
                    ..Default::default()
                },
                change_log: String::new(),
            },
        )
        .unwrap();
        assert!(live.version_number < timeline.version_number);
    }

    /// The public index filters by visibility before collapsing ghosts.
    #[test]
    fn home_index_hides_ghosts_and_private_worlds() {
        let fixture = BackendFixture::new();
        fixture.seed_user("owner", Rank::Admin);
        fixture.seed_world("0101", "Alpha", "d", "owner");
        // Ghost fragment collapsing into the 0101 trunk.
        fixture.seed_world("01010001", "Fantasma", "d", "owner");
        // Draft world, invisible to anonymous readers.
        let hidden = World::new("0102".parse().unwrap(), "Oculto", Some("owner".into()));
        fixture
            .connections
            .exclusive()
            .unwrap()
            .create_world(hidden)
            .unwrap();

        let list = flows::home_index(&fixture.connections, None, &[]).unwrap();
        let ids: Vec<String> = list.iter().map(|w| w.id.to_string()).collect();
        assert_eq!(ids, vec!["0101"]);
    }

    /// The Auto-Noos flow with an unreachable collaborator fails without
    /// creating any proposal.
    #[test]
    fn llm_failure_creates_no_proposal() {
        let fixture = BackendFixture::new();
        let owner = fixture.seed_user("owner", Rank::Admin);
        // Level 12 has no schema, forcing the generic extraction path.
        let deep = "01".repeat(12);
        fixture.seed_world(&deep, "Sin esquema", "Una descripción suficientemente larga.", "owner");

        let result = flows::generate_metadata_proposal(
            &fixture.connections,
            &fixture.ai,
            &owner,
            usecases::AutoNoosRequest {
                world: deep.parse().unwrap(),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert!(fixture.world_proposals(&deep).is_empty());
    }
}
