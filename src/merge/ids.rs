//! Fresh identifier generation.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::Guid;

const MAX_DRAWS: usize = 64;

/// Source of fresh project GUIDs.
pub trait GuidGenerator {
    fn next_guid(&mut self) -> Guid;
}

/// Random v4 GUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomGuids;

impl GuidGenerator for RandomGuids {
    fn next_guid(&mut self) -> Guid {
        Guid::new_v4()
    }
}

/// Counting GUIDs, `{00000000-0000-0000-0000-000000000001}` onward.
#[derive(Debug, Default, Clone)]
pub struct SequentialGuids {
    next: u128,
}

impl SequentialGuids {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl GuidGenerator for SequentialGuids {
    fn next_guid(&mut self) -> Guid {
        self.next += 1;
        Guid::from_uuid(Uuid::from_u128(self.next))
    }
}

/// Hands out GUIDs that are not taken by any entry seen so far.
pub struct GuidAllocator<'g> {
    generator: &'g mut dyn GuidGenerator,
    taken: HashSet<Guid>,
}

impl<'g> GuidAllocator<'g> {
    pub fn new(generator: &'g mut dyn GuidGenerator) -> Self {
        Self {
            generator,
            taken: HashSet::new(),
        }
    }

    pub fn reserve(&mut self, guid: &Guid) {
        self.taken.insert(guid.clone());
    }

    pub fn fresh(&mut self) -> Guid {
        for _ in 0..MAX_DRAWS {
            let guid = self.generator.next_guid();
            if self.taken.insert(guid.clone()) {
                return guid;
            }
        }

        // The injected generator keeps repeating itself
        tracing::warn!("GUID generator produced only taken identifiers; using random GUIDs");
        loop {
            let guid = Guid::new_v4();
            if self.taken.insert(guid.clone()) {
                return guid;
            }
        }
    }
}
