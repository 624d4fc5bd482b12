#[macro_use]
extern crate tracing;


use scene2d::{
    Flow,
    Notice,
    NoticeKind,
    RectMask,
    Scene,
};
use tracing_subscriber::{
    prelude::*,
    EnvFilter,
    Registry,
};
use vek::*;


fn main() {
    // initialize and install logging system
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty();
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(stdout_log);
    tracing::subscriber::set_global_default(subscriber)
        .expect("unable to install log subscriber");
    info!("starting demo scene");

    let mut scene = Scene::new();
    let root = scene.root();

    let left = scene.spawn_corporeal("left", RectMask);
    scene.set_size(left, Extent2::new(10.0, 10.0));
    scene.set_position(left, Vec2::new(-30.0, 0.0));
    scene.set_velocity(left, Vec2::new(20.0, 0.0));

    let right = scene.spawn_corporeal("right", RectMask);
    scene.set_size(right, Extent2::new(10.0, 10.0));
    scene.set_position(right, Vec2::new(30.0, 0.0));
    scene.set_velocity(right, Vec2::new(-20.0, 0.0));

    scene.adopt(root, left).expect("failed to attach left body");
    scene.adopt(root, right).expect("failed to attach right body");

    // bounce apart when the masks meet
    for body in [left, right] {
        scene.listen(body, NoticeKind::CollisionBegin, |scene, node, notice| {
            if let &Notice::CollisionBegin { other } = notice {
                info!(
                    "'{}' hit '{}' at {:?}",
                    scene.name(node),
                    scene.name(other),
                    scene.global_position(node),
                );
                let velocity = scene.velocity(node);
                scene.set_velocity(node, -velocity);
            }
            Flow::Continue
        });
        scene.listen(body, NoticeKind::CollisionEnd, |scene, node, notice| {
            if let &Notice::CollisionEnd { other } = notice {
                info!("'{}' cleared '{}'", scene.name(node), scene.name(other));
            }
            Flow::Continue
        });
    }

    scene.start();
    for _ in 0..120 {
        scene.update(1.0 / 60.0);
    }

    info!(
        "settled at {:?} and {:?}",
        scene.global_position(left),
        scene.global_position(right),
    );
}
