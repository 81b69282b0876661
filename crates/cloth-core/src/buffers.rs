use glam::Vec4;

/// Part a position buffer plays in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Positions one step ago, the Verlet reference.
    Previous,
    /// Last finalized positions; what read-back sees.
    Current,
    /// Unconstrained prediction, then Current's relaxation partner.
    Provisional,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Previous, Role::Current, Role::Provisional];

    /// Storage slot backing this role.
    #[inline]
    pub const fn slot(self) -> usize {
        match self {
            Role::Previous => 0,
            Role::Current => 1,
            Role::Provisional => 2,
        }
    }
}

/// `(source, destination)` roles of relaxation pass `pass`.
///
/// Even passes read Provisional and write Current, odd passes the reverse.
#[inline]
pub const fn role_for(pass: u32) -> (Role, Role) {
    if pass % 2 == 0 {
        (Role::Provisional, Role::Current)
    } else {
        (Role::Current, Role::Provisional)
    }
}

/// Role holding the result after `passes` relaxation passes.
///
/// With zero passes the prediction is never copied anywhere, so there is no
/// meaningful answer.
#[inline]
pub const fn final_role(passes: u32) -> Option<Role> {
    if passes == 0 {
        None
    } else {
        Some(role_for(passes - 1).1)
    }
}

/// Three position slots plus the normal field, all `len` elements long.
///
/// Stages borrow disjoint slots through [`split`](Self::split) and friends,
/// so a dispatch can never read the buffer it writes.
#[derive(Debug)]
pub struct BufferPool {
    slots: [Vec<Vec4>; 3],
    normals: Vec<Vec4>,
}

impl BufferPool {
    /// Assemble a pool from pre-allocated storage.
    ///
    /// # Panics
    ///
    /// Panics if the four buffers differ in length.
    pub fn new(slots: [Vec<Vec4>; 3], normals: Vec<Vec4>) -> Self {
        let len = normals.len();
        assert!(
            slots.iter().all(|s| s.len() == len),
            "position and normal buffers must have equal length"
        );
        Self { slots, normals }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.normals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    #[inline]
    pub fn get(&self, role: Role) -> &[Vec4] {
        &self.slots[role.slot()]
    }

    #[inline]
    pub fn get_mut(&mut self, role: Role) -> &mut [Vec4] {
        &mut self.slots[role.slot()]
    }

    #[inline]
    pub fn normals(&self) -> &[Vec4] {
        &self.normals
    }

    /// Read one role while writing another.
    ///
    /// # Panics
    ///
    /// Panics if `read == write`.
    pub fn split(&mut self, read: Role, write: Role) -> (&[Vec4], &mut [Vec4]) {
        assert_ne!(read, write, "a stage may not read and write the same buffer");
        let mut slots = self.slots.each_mut().map(Some);
        match (slots[read.slot()].take(), slots[write.slot()].take()) {
            (Some(src), Some(dst)) => (src.as_slice(), dst.as_mut_slice()),
            _ => unreachable!("distinct roles map to distinct slots"),
        }
    }

    /// `(previous, current, provisional)` for the integrator.
    pub fn advance_views(&mut self) -> (&[Vec4], &[Vec4], &mut [Vec4]) {
        let [previous, current, provisional] = self.slots.each_mut().map(|s| s.as_mut_slice());
        (&*previous, &*current, provisional)
    }

    /// `(current, normals)` for the normal estimator.
    pub fn normal_views(&mut self) -> (&[Vec4], &mut [Vec4]) {
        (&self.slots[Role::Current.slot()], &mut self.normals)
    }
}
