//! Frame-bounded update hooks.


use crate::{
    event::{
        Flow,
        ListenerId,
        NoticeKind,
    },
    scene::Scene,
};
use std::{
    cell::Cell,
    rc::Rc,
};


/// A hook on the root's update notice that runs for a fixed number of
/// frames and then removes itself.
pub struct Animator;

impl Animator {
    /// Invoke `action(scene, frame)` on each of the next `duration`
    /// update ticks, with `frame` counting up from zero. The underlying
    /// listener unregisters itself on the tick after the last frame; the
    /// returned id can cancel it earlier.
    pub fn spawn<F>(scene: &mut Scene, duration: u32, mut action: F) -> ListenerId
    where
        F: FnMut(&mut Scene, u32) + 'static,
    {
        let root = scene.root();
        let slot = Rc::new(Cell::new(None));
        let held = Rc::clone(&slot);
        let mut frame = 0;
        let id = scene.listen(root, NoticeKind::Update, move |scene, _, _| {
            if frame < duration {
                action(scene, frame);
                frame += 1;
            } else if let Some(id) = held.get() {
                scene.unlisten(id);
            }
            Flow::Continue
        });
        slot.set(Some(id));
        id
    }
}
