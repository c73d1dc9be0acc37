pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::{proposal_builder::*, world_builder::*};

pub mod world_builder {

    use super::*;
    use crate::{id::*, jid::*, metadata::*, status::*, time::*, user::*, version::*, world::*};

    #[derive(Debug)]
    pub struct WorldBuild {
        world: World,
    }

    impl WorldBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.world.id = id.parse().unwrap();
            self
        }
        pub fn public_id(mut self, pid: &str) -> Self {
            self.world.public_id = pid.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.world.name = name.into();
            self
        }
        pub fn description(mut self, desc: &str) -> Self {
            self.world.description = desc.into();
            self
        }
        pub fn author(mut self, author: &str) -> Self {
            self.world.author = Some(author.into());
            self
        }
        pub fn status(mut self, status: WorldStatus) -> Self {
            self.world.status = status;
            self
        }
        pub fn version(mut self, v: u64) -> Self {
            self.world.current_version_number = v.into();
            self
        }
        pub fn visible(mut self, visible: bool) -> Self {
            self.world.visible_publico = visible;
            self
        }
        pub fn allow_proposals(mut self, allow: bool) -> Self {
            self.world.allow_proposals = allow;
            self
        }
        pub fn metadata(mut self, metadata: Metadata) -> Self {
            self.world.metadata = metadata;
            self
        }
        pub fn chronology(mut self, start_year: Option<i64>, end_year: Option<i64>) -> Self {
            self.world.metadata.set_chronology(start_year, end_year);
            self
        }
        pub fn finish(self) -> World {
            self.world
        }
    }

    impl Builder for World {
        type Build = WorldBuild;
        fn build() -> Self::Build {
            WorldBuild {
                world: World {
                    id: JId::parse("01").unwrap(),
                    public_id: PublicId::new(),
                    name: String::new(),
                    description: String::new(),
                    metadata: Metadata::new(),
                    status: WorldStatus::Live,
                    is_active: true,
                    visible_publico: true,
                    allow_proposals: true,
                    author: None,
                    current_version_number: VersionNumber::initial(),
                    current_author_name: None,
                    created_at: TimestampMs::from_inner(0),
                },
            }
        }
    }
}

pub mod proposal_builder {

    use super::*;
    use crate::{metadata::*, proposal::*, status::*, time::*, version::*};

    #[derive(Debug)]
    pub struct WorldProposalBuild {
        proposal: WorldProposal,
    }

    impl WorldProposalBuild {
        pub fn id(mut self, id: u64) -> Self {
            self.proposal.id = id.into();
            self
        }
        pub fn world(mut self, id: &str) -> Self {
            self.proposal.world = id.parse().unwrap();
            self
        }
        pub fn version(mut self, v: u64) -> Self {
            self.proposal.version_number = v.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.proposal.proposed_name = name.into();
            self
        }
        pub fn description(mut self, desc: &str) -> Self {
            self.proposal.proposed_description = desc.into();
            self
        }
        pub fn author(mut self, author: &str) -> Self {
            self.proposal.author = author.into();
            self
        }
        pub fn status(mut self, status: ProposalStatus) -> Self {
            self.proposal.status = status;
            self
        }
        pub fn cambios(mut self, cambios: ChangeIntent) -> Self {
            self.proposal.cambios = cambios;
            self
        }
        pub fn change_log(mut self, log: &str) -> Self {
            self.proposal.change_log = log.into();
            self
        }
        pub fn timeline(mut self, year: i32, snapshot: TimelineSnapshot) -> Self {
            self.proposal.change_type = ChangeType::Timeline;
            self.proposal.timeline_year = Some(year);
            self.proposal.proposed_snapshot = Some(snapshot);
            self
        }
        pub fn finish(self) -> WorldProposal {
            self.proposal
        }
    }

    impl Builder for WorldProposal {
        type Build = WorldProposalBuild;
        fn build() -> Self::Build {
            WorldProposalBuild {
                proposal: WorldProposal {
                    id: ProposalId::default(),
                    world: "01".parse().unwrap(),
                    version_number: VersionNumber::initial(),
                    proposed_name: String::new(),
                    proposed_description: String::new(),
                    cambios: ChangeIntent::Update { metadata: None },
                    change_log: String::new(),
                    admin_feedback: None,
                    status: ProposalStatus::Pending,
                    change_type: ChangeType::Live,
                    timeline_year: None,
                    proposed_snapshot: None,
                    author: "anon".into(),
                    reviewer: None,
                    created_at: TimestampMs::from_inner(0),
                },
            }
        }
    }
}
