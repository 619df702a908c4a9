use std::cell::RefCell;
use std::rc::Rc;

use renderer::{
    BindingError, InputAdapter, InputEffect, InputEvent, InputKey, ManualClock, ProgramBackend,
    ProgramBinding, RunState, TickOutcome, UniformState, Viewer, MODE_ACTIVE, MODE_IDLE,
};
use scheduler::FrameQueue;
use shaders::{Origin, ShaderRegistry};
use viewconfig::ViewerConfig;

#[derive(Debug, Clone)]
struct Draw {
    fragment: String,
    uniforms: UniformState,
}

#[derive(Default)]
struct Log {
    compiles: Vec<String>,
    draws: Vec<Draw>,
}

/// Backend that records compiles and draws; sources containing `#error`
/// fail to compile.
#[derive(Clone, Default)]
struct RecordingBackend {
    log: Rc<RefCell<Log>>,
}

impl RecordingBackend {
    fn draw_count(&self) -> usize {
        self.log.borrow().draws.len()
    }

    fn last_draw(&self) -> Draw {
        self.log.borrow().draws.last().cloned().expect("no draws recorded")
    }
}

impl ProgramBackend for RecordingBackend {
    type Program = String;

    fn compile(&mut self, program: &ProgramBinding) -> anyhow::Result<String> {
        if program.fragment_source.contains("#error") {
            anyhow::bail!("ERROR: 0:1: '#error' : broken on purpose");
        }
        self.log.borrow_mut().compiles.push(program.name.clone());
        Ok(program.fragment_source.clone())
    }

    fn render(&mut self, program: &String, uniforms: &UniformState) -> anyhow::Result<()> {
        self.log.borrow_mut().draws.push(Draw {
            fragment: program.clone(),
            uniforms: uniforms.clone(),
        });
        Ok(())
    }
}

type TestViewer = Viewer<RecordingBackend, ManualClock, FrameQueue>;

fn viewer_with(options: &str, registry: ShaderRegistry) -> (TestViewer, RecordingBackend, ManualClock) {
    let config = ViewerConfig::parse(options).config;
    let backend = RecordingBackend::default();
    let clock = ManualClock::new();
    let viewer = Viewer::new(
        config,
        (1280, 720),
        registry,
        backend.clone(),
        clock.clone(),
        FrameQueue::new(),
    )
    .expect("viewer builds");
    (viewer, backend, clock)
}

fn viewer(options: &str) -> (TestViewer, RecordingBackend, ManualClock) {
    viewer_with(options, ShaderRegistry::builtin())
}

fn tick_once(viewer: &mut TestViewer) -> TickOutcome {
    let ticket = viewer.scheduler_mut().pop().expect("a frame should be scheduled");
    viewer.frame_tick(ticket)
}

#[test]
fn elapsed_time_only_advances_while_running() {
    let (mut viewer, _, clock) = viewer("");
    let mut last = viewer.uniforms().elapsed_time;

    for round in 0..3 {
        clock.advance_secs(2.0);
        assert_eq!(viewer.uniforms().elapsed_time, last, "stopped round {round}");

        viewer.start();
        for _ in 0..4 {
            clock.advance_secs(0.25);
            tick_once(&mut viewer);
            assert!(viewer.uniforms().elapsed_time >= last);
            last = viewer.uniforms().elapsed_time;
        }
        viewer.stop();
        viewer.stop();
        assert_eq!(viewer.run_state(), RunState::Stopped);
        assert_eq!(viewer.uniforms().elapsed_time, last);
    }
    assert!((last - 3.0).abs() < 1e-9);
}

#[test]
fn one_tick_integrates_exactly_the_clock_delta() {
    let (mut viewer, _, clock) = viewer("");
    clock.advance_secs(100.0);
    viewer.start();
    clock.advance_secs(0.75);

    let outcome = tick_once(&mut viewer);
    assert!(matches!(outcome, TickOutcome::Drawn { delta } if (delta - 0.75).abs() < 1e-9));
    assert!((viewer.uniforms().elapsed_time - 0.75).abs() < 1e-9);
}

#[test]
fn stop_draws_once_and_pending_tick_is_a_no_op() {
    let (mut viewer, backend, clock) = viewer("");
    viewer.start();
    clock.advance_secs(0.5);
    tick_once(&mut viewer);
    let before_stop = backend.draw_count();

    viewer.stop();
    assert_eq!(backend.draw_count(), before_stop + 1);
    let resting = backend.last_draw();
    assert_eq!(resting.uniforms.mode, MODE_IDLE);
    let frozen = viewer.uniforms().clone();

    clock.advance_secs(3.0);
    assert_eq!(tick_once(&mut viewer), TickOutcome::Stale);
    assert_eq!(viewer.uniforms(), &frozen);
    assert_eq!(backend.draw_count(), before_stop + 1);
    assert!(viewer.scheduler().is_empty());
}

#[test]
fn swap_keeps_time_and_pointer() {
    let (mut viewer, backend, clock) = viewer("shader:upstream");
    let adapter = InputAdapter::new((1280, 720));
    adapter.dispatch(&mut viewer, InputEvent::PointerMoved { x: 960.0, y: 180.0 });
    viewer.start();
    clock.advance_secs(1.5);
    tick_once(&mut viewer);
    let before = viewer.uniforms().clone();

    viewer.select_shader("cube").expect("cube is built in");
    let draw = backend.last_draw();
    let cube = ShaderRegistry::builtin().fragment("cube").unwrap().to_string();
    assert_eq!(draw.fragment, cube);
    assert_eq!(draw.uniforms.elapsed_time, before.elapsed_time);
    assert_eq!(draw.uniforms.pointer, [0.5, -0.5]);
    assert_eq!(viewer.uniforms(), &before);
}

#[test]
fn unknown_shader_keeps_previous_program() {
    let (mut viewer, backend, _) = viewer("shader:night");
    let err = viewer.select_shader("no-such-shader").unwrap_err();
    assert!(matches!(err, BindingError::Registry(_)));
    assert!(err.to_string().contains("no-such-shader"));

    viewer.redraw();
    let night = ShaderRegistry::builtin().fragment("night").unwrap().to_string();
    assert_eq!(backend.last_draw().fragment, night);
    assert_eq!(viewer.current_shader(), "night");
}

#[test]
fn compile_failure_keeps_last_good_frame() {
    let mut registry = ShaderRegistry::builtin();
    registry.insert("broken", "#error nope\n".to_string(), Origin::Builtin);
    let (mut viewer, backend, _) = viewer_with("shader:cube", registry);
    let compiles_before = backend.log.borrow().compiles.len();

    let err = viewer.select_shader("broken").unwrap_err();
    assert!(matches!(err, BindingError::Compile { ref shader, .. } if shader == "broken"));
    assert_eq!(viewer.current_shader(), "cube");

    viewer.redraw();
    let cube = ShaderRegistry::builtin().fragment("cube").unwrap().to_string();
    assert_eq!(backend.last_draw().fragment, cube);
    assert_eq!(backend.log.borrow().compiles.len(), compiles_before);

    viewer.select_shader("night").expect("recovers with another program");
    assert_eq!(viewer.binding().active_name(), Some("night"));
}

#[test]
fn config_scenario_half_size_cube_autostart() {
    let (viewer, backend, _) = viewer("#shader:cube/start");
    assert_eq!(viewer.uniforms().resolution, (640, 360));
    assert_eq!(viewer.binding().bound_name(), Some("cube"));
    let cube = ShaderRegistry::builtin().fragment("cube").unwrap().to_string();
    assert_eq!(viewer.binding().program().unwrap().fragment_source, cube);
    assert_eq!(viewer.run_state(), RunState::Running);
    assert_eq!(viewer.uniforms().mode, MODE_ACTIVE);
    assert_eq!(viewer.scheduler().len(), 1);
    assert_eq!(backend.draw_count(), 1, "initial frame is drawn before starting");
}

#[test]
fn hd_keeps_full_resolution() {
    let (viewer, _, _) = viewer("shader:cube/hd");
    assert_eq!(viewer.uniforms().resolution, (1280, 720));
    assert_eq!(viewer.run_state(), RunState::Stopped);
}

#[test]
fn unknown_configured_shader_falls_back_to_default() {
    let (viewer, _, _) = viewer("shader:missing");
    assert_eq!(viewer.current_shader(), "upstream");
    assert_eq!(viewer.binding().bound_name(), Some("upstream"));
}

#[test]
fn pointer_to_centre_while_stopped_draws_once() {
    let (mut viewer, backend, _) = viewer("");
    let adapter = InputAdapter::new((1280, 720));
    let before = backend.draw_count();

    let effect = adapter.dispatch(&mut viewer, InputEvent::PointerMoved { x: 640.0, y: 360.0 });
    assert_eq!(effect, InputEffect::PointerUpdated { redrawn: true });
    assert_eq!(viewer.uniforms().pointer, [0.0, 0.0]);
    assert_eq!(backend.draw_count(), before + 1);
    assert_eq!(backend.last_draw().uniforms.pointer, [0.0, 0.0]);
}

#[test]
fn click_and_space_toggle() {
    let (mut viewer, _, _) = viewer("");
    let adapter = InputAdapter::new((1280, 720));
    assert_eq!(
        adapter.dispatch(&mut viewer, InputEvent::Click),
        InputEffect::Toggled(RunState::Running)
    );
    assert_eq!(
        adapter.dispatch(&mut viewer, InputEvent::KeyUp(InputKey::Space)),
        InputEffect::Toggled(RunState::Stopped)
    );
    assert_eq!(
        adapter.dispatch(&mut viewer, InputEvent::KeyDown(InputKey::Space)),
        InputEffect::Ignored
    );
}

#[test]
fn movement_keys_are_no_ops() {
    let (mut viewer, backend, _) = viewer("");
    let adapter = InputAdapter::new((1280, 720));
    let before = viewer.uniforms().clone();
    for key in [InputKey::W, InputKey::A, InputKey::S, InputKey::D, InputKey::Up, InputKey::Down] {
        assert_eq!(adapter.dispatch(&mut viewer, InputEvent::KeyDown(key)), InputEffect::Ignored);
        assert_eq!(adapter.dispatch(&mut viewer, InputEvent::KeyUp(key)), InputEffect::Ignored);
    }
    assert_eq!(viewer.uniforms(), &before);
    assert_eq!(backend.draw_count(), 1);
}

#[test]
fn selection_keys_report_new_options() {
    let (mut viewer, _, _) = viewer("shader:upstream/hd");
    let adapter = InputAdapter::new((1280, 720));

    let effect = adapter.dispatch(&mut viewer, InputEvent::KeyUp(InputKey::Tab));
    assert_eq!(
        effect,
        InputEffect::ShaderSelected {
            name: "cube".to_string(),
            options: "shader:cube/hd".to_string(),
        }
    );

    let effect = adapter.dispatch(&mut viewer, InputEvent::KeyUp(InputKey::Digit(4)));
    assert!(matches!(effect, InputEffect::ShaderSelected { ref name, .. } if name == "mountains"));

    let effect = adapter.dispatch(&mut viewer, InputEvent::KeyUp(InputKey::Digit(9)));
    assert_eq!(effect, InputEffect::Ignored);
    assert_eq!(viewer.current_shader(), "mountains");

    let effect = adapter.dispatch(&mut viewer, InputEvent::SelectShader("refraction".into()));
    assert!(matches!(effect, InputEffect::ShaderSelected { ref options, .. } if options == "shader:refraction/hd"));

    let effect = adapter.dispatch(&mut viewer, InputEvent::CycleShader);
    assert!(matches!(effect, InputEffect::ShaderSelected { ref name, .. } if name == "upstream"));
}

#[test]
fn restart_after_stale_tick_measures_from_new_start() {
    let (mut viewer, _, clock) = viewer("start");
    let stale = viewer.scheduler_mut().pop().unwrap();
    viewer.stop();
    clock.advance_secs(10.0);
    viewer.start();
    clock.advance_secs(0.1);

    assert_eq!(viewer.frame_tick(stale), TickOutcome::Stale);
    assert!(matches!(tick_once(&mut viewer), TickOutcome::Drawn { .. }));
    assert!((viewer.uniforms().elapsed_time - 0.1).abs() < 1e-9);
}
