//! Picking and input integration tests on a headless app.

mod common;

use bevy::prelude::*;
use common::{SeenRoutes, mounted_app};
use orrery::camera::{CameraController, Viewport};
use orrery::describe_bodies;
use orrery::kinematics::SimulationState;
use orrery::picking::PickRequest;

fn screen_point_of(app: &App, index: usize) -> Vec2 {
    let world = app.world();
    let position = world.resource::<SimulationState>().bodies[index].position;
    let controller = world.resource::<CameraController>();
    let viewport = world.resource::<Viewport>();
    controller
        .project_to_screen(position, viewport)
        .expect("body in front of the camera")
}

#[test]
fn clicking_earth_requests_its_route_once() {
    let mut app = mounted_app();
    app.update();

    let earth = describe_bodies().iter().position(|b| b.name == "Earth").unwrap();
    let screen = screen_point_of(&app, earth);
    app.world_mut().write_message(PickRequest { screen });
    app.update();
    app.update();

    assert_eq!(app.world().resource::<SeenRoutes>().0, vec!["/earth"]);
    assert_eq!(app.world().resource::<CameraController>().focused(), Some(earth));
}

#[test]
fn clicking_empty_sky_does_nothing() {
    let mut app = mounted_app();
    app.update();

    app.world_mut().write_message(PickRequest { screen: Vec2::new(2.0, 2.0) });
    app.update();

    assert!(app.world().resource::<SeenRoutes>().0.is_empty());
    assert_eq!(app.world().resource::<CameraController>().focused(), None);
}
