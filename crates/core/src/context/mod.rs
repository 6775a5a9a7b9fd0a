//! Owned session state tying the controller to its collaborators.
//!
//! A [`VisContext`] is created once per session. It sets the scene up on
//! creation and tears it down exactly once, either through
//! [`VisContext::shutdown`] or when dropped.

use std::time::Duration;

use rand::{rngs::StdRng, Rng};

use crate::{
    parse_value, AppConfig, ControllerEvent, DataVisError, Element, LayoutParams, PlaybackState,
    Result, SceneDescriptor, SceneSink, StructureController, StructureKind, TonePlayer,
    ToneMapping,
};

pub struct VisContext<S: SceneSink, A: TonePlayer, R: Rng = StdRng> {
    controller: StructureController<R>,
    scene: S,
    audio: A,
    mapping: ToneMapping,
    released: bool,
}

impl<S: SceneSink, A: TonePlayer> VisContext<S, A, StdRng> {
    pub fn create(config: &AppConfig, scene: S, audio: A) -> Result<Self> {
        let controller = StructureController::from_config(config)?;
        Self::with_controller(config, controller, scene, audio)
    }
}

impl<S: SceneSink, A: TonePlayer, R: Rng> VisContext<S, A, R> {
    pub fn with_controller(
        config: &AppConfig,
        controller: StructureController<R>,
        mut scene: S,
        audio: A,
    ) -> Result<Self> {
        scene.setup(&SceneDescriptor::default())?;
        scene.set_element_size(controller.layout().element_size);
        scene.sync_scene(&controller.elements());
        tracing::info!(
            kind = %controller.kind(),
            elements = controller.values().len(),
            "visualiser ready"
        );

        Ok(Self {
            controller,
            scene,
            audio,
            mapping: config.audio,
            released: false,
        })
    }

    pub fn controller(&self) -> &StructureController<R> {
        &self.controller
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn elements(&self) -> Vec<Element> {
        self.controller.elements()
    }

    pub fn playback(&self) -> PlaybackState {
        self.controller.playback()
    }

    pub fn insert(&mut self, value: i64) {
        let event = self.controller.insert(value);
        self.apply(event);
    }

    /// Inserts the integer typed by the user. Anything else is ignored and
    /// `false` is returned.
    pub fn insert_input(&mut self, input: &str) -> bool {
        match parse_value(input) {
            Some(value) => {
                self.insert(value);
                true
            }
            None => {
                tracing::debug!(input, "ignoring non-integer input");
                false
            }
        }
    }

    pub fn remove(&mut self) -> Result<i64> {
        let was_playing = self.controller.is_playing();
        let event = self.controller.remove()?;
        self.apply(event);
        if was_playing && !self.controller.is_playing() {
            self.apply(ControllerEvent::AutoStopped);
        }
        match event {
            ControllerEvent::Removed(value) => Ok(value),
            other => Err(DataVisError::msg(format!("unexpected removal outcome {other:?}"))),
        }
    }

    pub fn start_auto_play(&mut self, now: Duration) -> bool {
        self.controller.start_auto_play(now)
    }

    pub fn stop_auto_play(&mut self) {
        self.controller.stop_auto_play();
    }

    pub fn set_kind(&mut self, kind: StructureKind) {
        self.controller.set_kind(kind);
        self.scene.sync_scene(&self.controller.elements());
    }

    pub fn set_layout(&mut self, params: LayoutParams) -> Result<()> {
        self.controller.set_layout(params)?;
        self.scene.set_element_size(params.element_size);
        self.scene.sync_scene(&self.controller.elements());
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.controller.set_speed(speed)
    }

    /// Advances auto-play to `now` and pushes the results to the scene and
    /// the audio backend.
    pub fn poll(&mut self, now: Duration) -> Vec<ControllerEvent> {
        let events = self.controller.poll(now);
        for event in &events {
            self.apply(*event);
        }
        events
    }

    /// Tears the session down. Dropping the context has the same effect.
    pub fn shutdown(mut self) {
        self.release();
    }

    fn apply(&mut self, event: ControllerEvent) {
        let value = match event {
            ControllerEvent::Inserted(value) | ControllerEvent::Removed(value) => value,
            ControllerEvent::AutoStopped => {
                tracing::info!("auto-play stopped: structure is empty");
                return;
            }
        };

        self.scene.sync_scene(&self.controller.elements());
        self.play(value);
    }

    fn play(&mut self, value: i64) {
        let outcome = self
            .mapping
            .tone_for(value)
            .and_then(|tone| self.audio.play_tone(&tone));
        if let Err(err) = outcome {
            tracing::warn!(value, error = %err, "failed to play tone");
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.controller.stop_auto_play();
        self.scene.teardown();
        self.audio.shutdown();
        tracing::info!("visualiser torn down");
    }
}

impl<S: SceneSink, A: TonePlayer, R: Rng> Drop for VisContext<S, A, R> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S, A, R> std::fmt::Debug for VisContext<S, A, R>
where
    S: SceneSink + std::fmt::Debug,
    A: TonePlayer + std::fmt::Debug,
    R: Rng,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisContext")
            .field("values", &self.controller.values())
            .field("scene", &self.scene)
            .field("audio", &self.audio)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rand::SeedableRng;

    use super::*;
    use crate::{SceneGraph, StructureConfig, Tone};

    /// Records calls so tests can check what reached the collaborators.
    #[derive(Debug, Default)]
    struct Journal {
        synced: Vec<Vec<i64>>,
        tones: Vec<i64>,
        teardowns: usize,
        shutdowns: usize,
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingScene(Rc<RefCell<Journal>>);

    impl SceneSink for RecordingScene {
        fn set_element_size(&mut self, _size: f32) {}

        fn sync_scene(&mut self, elements: &[Element]) {
            let values = elements.iter().map(|e| e.value).collect();
            self.0.borrow_mut().synced.push(values);
        }

        fn teardown(&mut self) {
            self.0.borrow_mut().teardowns += 1;
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingPlayer {
        journal: Rc<RefCell<Journal>>,
        fail: bool,
    }

    impl TonePlayer for RecordingPlayer {
        fn play_tone(&mut self, tone: &Tone) -> Result<()> {
            if self.fail {
                return Err(DataVisError::Audio("no output device".into()));
            }
            self.journal.borrow_mut().tones.push(tone.value);
            Ok(())
        }

        fn shutdown(&mut self) {
            self.journal.borrow_mut().shutdowns += 1;
        }
    }

    fn config(kind: StructureKind, initial: &[i64]) -> AppConfig {
        AppConfig {
            structure: StructureConfig {
                kind,
                initial: initial.to_vec(),
                ..StructureConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn build_context(
        kind: StructureKind,
        initial: &[i64],
        fail_audio: bool,
    ) -> (
        VisContext<RecordingScene, RecordingPlayer, StdRng>,
        Rc<RefCell<Journal>>,
    ) {
        let journal = Rc::new(RefCell::new(Journal::default()));
        let config = config(kind, initial);
        let controller =
            StructureController::with_rng(&config, StdRng::seed_from_u64(1)).unwrap();
        let scene = RecordingScene(journal.clone());
        let player = RecordingPlayer {
            journal: journal.clone(),
            fail: fail_audio,
        };
        let context = VisContext::with_controller(&config, controller, scene, player).unwrap();
        (context, journal)
    }

    #[test]
    fn mutations_sync_the_scene_and_play_tones() {
        let (mut context, journal) = build_context(StructureKind::Stack, &[1, 2], false);
        context.insert(3);
        assert_eq!(context.remove().unwrap(), 3);

        let journal = journal.borrow();
        assert_eq!(journal.synced, vec![vec![1, 2], vec![1, 2, 3], vec![1, 2]]);
        assert_eq!(journal.tones, vec![3, 3]);
    }

    #[test]
    fn invalid_input_changes_nothing() {
        let (mut context, journal) = build_context(StructureKind::Queue, &[1], false);
        assert!(!context.insert_input("twelve"));
        assert!(!context.insert_input("   "));
        assert!(context.insert_input(" 12"));

        assert_eq!(context.controller().values(), vec![1, 12]);
        assert_eq!(journal.borrow().synced.len(), 2);
    }

    #[test]
    fn removing_from_empty_leaves_collaborators_alone() {
        let (mut context, journal) = build_context(StructureKind::Queue, &[], false);
        assert!(matches!(context.remove(), Err(DataVisError::EmptyStructure)));

        let journal = journal.borrow();
        assert_eq!(journal.synced.len(), 1);
        assert!(journal.tones.is_empty());
    }

    #[test]
    fn audio_failures_do_not_block_visual_updates() {
        let (mut context, journal) = build_context(StructureKind::Queue, &[1], true);
        context.insert(2);
        assert_eq!(context.remove().unwrap(), 1);

        let journal = journal.borrow();
        assert_eq!(journal.synced.last().unwrap(), &vec![2]);
        assert!(journal.tones.is_empty());
    }

    #[test]
    fn auto_play_events_reach_the_scene() {
        let (mut context, journal) = build_context(StructureKind::Queue, &[5], false);
        assert!(context.start_auto_play(Duration::ZERO));
        context.poll(Duration::ZERO);

        assert!(!context.playback().running);
        let journal = journal.borrow();
        assert_eq!(journal.synced.last().unwrap(), &Vec::<i64>::new());
        assert_eq!(journal.tones, vec![5]);
    }

    #[test]
    fn auto_play_cycle_syncs_every_step() {
        let (mut context, journal) = build_context(StructureKind::Queue, &[1, 2, 3], false);
        assert!(context.start_auto_play(Duration::ZERO));

        assert_eq!(context.poll(Duration::ZERO), vec![ControllerEvent::Removed(1)]);
        assert!(context.poll(Duration::from_millis(1999)).is_empty());

        let inserted = match context.poll(Duration::from_millis(2000)).as_slice() {
            [ControllerEvent::Inserted(value)] => *value,
            other => panic!("unexpected events {other:?}"),
        };
        assert!((1..=20).contains(&inserted));

        assert_eq!(
            context.poll(Duration::from_millis(4000)),
            vec![ControllerEvent::Removed(2)]
        );
        assert!(context.playback().running);

        let journal = journal.borrow();
        assert_eq!(
            journal.synced,
            vec![
                vec![1, 2, 3],
                vec![2, 3],
                vec![2, 3, inserted],
                vec![3, inserted],
            ]
        );
        assert_eq!(journal.tones, vec![1, inserted, 2]);
    }

    #[test]
    fn emptying_by_hand_stops_auto_play() {
        let (mut context, journal) = build_context(StructureKind::Stack, &[1, 2], false);
        context.start_auto_play(Duration::ZERO);
        context.poll(Duration::ZERO);

        assert_eq!(context.remove().unwrap(), 1);
        assert!(!context.playback().running);
        assert!(context.poll(Duration::from_millis(2000)).is_empty());

        let journal = journal.borrow();
        assert_eq!(journal.synced.last().unwrap(), &Vec::<i64>::new());
        assert_eq!(journal.tones, vec![2, 1]);
    }

    #[test]
    fn teardown_runs_once() {
        let (context, journal) = build_context(StructureKind::Ring, &[1, 2], false);
        context.shutdown();
        assert_eq!(journal.borrow().teardowns, 1);
        assert_eq!(journal.borrow().shutdowns, 1);

        let (context, journal) = build_context(StructureKind::Array, &[4], false);
        drop(context);
        assert_eq!(journal.borrow().teardowns, 1);
    }

    #[test]
    fn layout_changes_reach_the_scene_graph() {
        let config = config(StructureKind::Queue, &[1, 2, 3]);
        let mut context =
            VisContext::create(&config, SceneGraph::new(), crate::SineSynth::new()).unwrap();
        assert!(context.scene().descriptor().is_some());

        context
            .set_layout(LayoutParams {
                element_size: 2.0,
                spacing: 4.0,
                ring_radius: 5.0,
            })
            .unwrap();

        let xs: Vec<f32> = context.scene().meshes().iter().map(|m| m.position.x).collect();
        assert_eq!(xs, vec![-4.0, 0.0, 4.0]);
        assert!(context.scene().meshes().iter().all(|m| m.size == 2.0));
    }
}
