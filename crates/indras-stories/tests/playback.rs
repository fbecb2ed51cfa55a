//! End-to-end playback tests for the story viewer
//!
//! Every test drives a viewer with a manual clock, so timing is exact.

use indras_stories::mock::{ManualClock, MediaCall, RecordingHost, RecordingMessenger};
use indras_stories::{
    CloseReason, FrameOutcome, HostRoute, Input, Key, MediaEvent, MediaKind, MediaView,
    MessageKind, RetreatAtStart, SlidePosition, Story, StoryId, StoryViewer, ViewerBuilder,
    ViewerConfig, ViewerError,
};

type TestViewer = StoryViewer<ManualClock, RecordingMessenger, RecordingHost>;

/// Image stories for authors with the given bucket sizes; ids are "b{bucket}s{slide}"
fn stories_of(sizes: &[usize]) -> Vec<Story> {
    sizes
        .iter()
        .enumerate()
        .flat_map(|(b, &n)| {
            (0..n).map(move |s| {
                Story::image(
                    format!("b{}s{}", b, s),
                    format!("author{}", b),
                    format!("https://cdn.example/{}/{}.jpg", b, s),
                )
            })
        })
        .collect()
}

fn open(stories: &[Story], clock: &ManualClock) -> TestViewer {
    open_with(stories, clock, ViewerConfig::default(), RecordingMessenger::new())
}

fn open_with(
    stories: &[Story],
    clock: &ManualClock,
    config: ViewerConfig,
    messenger: RecordingMessenger,
) -> TestViewer {
    StoryViewer::open(stories, None, config, clock.clone(), messenger, RecordingHost::new())
        .expect("viewer should open")
}

/// Run one frame, requiring the clock to be running
fn frame(viewer: &mut TestViewer) -> FrameOutcome {
    let ticket = viewer.schedule_frame().expect("clock should be running");
    viewer.frame(ticket)
}

fn key(viewer: &mut TestViewer, key: Key) {
    viewer.handle(Input::Key(key)).unwrap();
}

#[test]
fn test_progress_monotonic_and_resets_on_transition() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[3]), &clock);

    let mut last = 0.0;
    for _ in 0..4 {
        clock.advance_ms(900);
        let FrameOutcome::Progress(progress) = frame(&mut viewer) else {
            panic!("slide should still be playing");
        };
        assert!(progress >= last);
        last = progress;
    }

    key(&mut viewer, Key::ArrowRight);
    assert_eq!(viewer.position(), SlidePosition::new(0, 1));
    assert_eq!(viewer.state().progress, 0.0);
    assert_eq!(viewer.state().elapsed_ms, 0);

    key(&mut viewer, Key::ArrowLeft);
    assert_eq!(viewer.position(), SlidePosition::START);
    assert_eq!(viewer.state().progress, 0.0);
}

#[test]
fn test_pause_resume_continues_from_elapsed() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[1]), &clock);

    clock.advance_ms(1_200);
    key(&mut viewer, Key::Space);
    assert!(viewer.state().paused);
    assert_eq!(viewer.state().elapsed_ms, 1_200);

    clock.advance_ms(3_000);
    assert!(viewer.schedule_frame().is_none());

    key(&mut viewer, Key::Space);
    assert!(!viewer.state().paused);
    assert_eq!(viewer.state().elapsed_ms, 1_200);

    clock.advance_ms(300);
    frame(&mut viewer);
    assert_eq!(viewer.state().elapsed_ms, 1_500);
    assert_eq!(viewer.state().progress, 0.3);
}

#[test]
fn test_advance_through_end_closes_without_wrapping() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2, 1]), &clock);

    key(&mut viewer, Key::ArrowRight);
    key(&mut viewer, Key::ArrowRight);
    assert_eq!(viewer.position(), SlidePosition::new(1, 0));
    assert!(!viewer.is_closed());

    key(&mut viewer, Key::ArrowRight);
    assert!(viewer.is_closed());
    assert_eq!(viewer.close_reason(), Some(CloseReason::Exhausted));
    assert_eq!(viewer.position(), SlidePosition::new(1, 0));

    // Further input after close is inert
    key(&mut viewer, Key::ArrowRight);
    assert_eq!(viewer.host().closes, vec![CloseReason::Exhausted]);
}

#[test]
fn test_retreat_at_start_stays() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2]), &clock);

    clock.advance_ms(700);
    key(&mut viewer, Key::ArrowLeft);
    assert_eq!(viewer.position(), SlidePosition::START);
    assert!(!viewer.is_closed());
    assert!(viewer.host().closes.is_empty());

    // The slide keeps playing
    clock.advance_ms(300);
    frame(&mut viewer);
    assert_eq!(viewer.state().elapsed_ms, 1_000);
}

#[test]
fn test_retreat_at_start_can_close() {
    let clock = ManualClock::new();
    let config = ViewerBuilder::new()
        .retreat_at_start(RetreatAtStart::Close)
        .build()
        .unwrap();
    let mut viewer = open_with(&stories_of(&[2]), &clock, config, RecordingMessenger::new());

    viewer.handle(Input::Tap { x: 5.0, width: 400.0 }).unwrap();
    assert_eq!(viewer.close_reason(), Some(CloseReason::Exhausted));
}

#[test]
fn test_five_advances_over_mixed_buckets() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2, 1, 3]), &clock);

    for _ in 0..5 {
        viewer.handle(Input::Tap { x: 300.0, width: 400.0 }).unwrap();
    }
    assert_eq!(viewer.position(), SlidePosition::new(2, 2));
    assert_eq!(viewer.current_story().id, StoryId::new("b2s2"));
}

#[test]
fn test_timed_completion_advances_once() {
    let clock = ManualClock::new();
    let stories = vec![
        Story::image("a1", "alice", "a1.jpg").with_duration_ms(1_000),
        Story::image("a2", "alice", "a2.jpg").with_duration_ms(1_000),
    ];
    let mut viewer = open(&stories, &clock);

    clock.advance_ms(2_500);
    assert_eq!(frame(&mut viewer), FrameOutcome::Advanced(SlidePosition::new(0, 1)));
    // Overshoot is not carried into the next slide
    assert_eq!(viewer.state().elapsed_ms, 0);

    clock.advance_ms(1_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Closed);
    assert_eq!(viewer.host().closes, vec![CloseReason::Exhausted]);
}

#[test]
fn test_video_waits_for_metadata() {
    let clock = ManualClock::new();
    let stories = vec![Story::video("v1", "alice", "v1.mp4")];
    let mut viewer = open(&stories, &clock);

    clock.advance_ms(10_000);
    assert!(viewer.schedule_frame().is_none());
    assert_eq!(viewer.state().progress, 0.0);
    assert_eq!(viewer.snapshot().media, MediaView::Loading);

    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::MetadataReady {
        handle,
        duration_secs: 4.0,
    });
    assert_eq!(viewer.state().resolved_duration_ms, Some(4_000));
    assert_eq!(viewer.snapshot().media, MediaView::Ready);

    clock.advance_ms(1_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Progress(0.25));
}

#[test]
fn test_media_failure_uses_fallback_and_advances() {
    let clock = ManualClock::new();
    let stories = vec![
        Story::video("v1", "alice", "broken.mp4"),
        Story::image("a2", "alice", "a2.jpg"),
    ];
    let mut viewer = open(&stories, &clock);

    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::Failed {
        handle,
        reason: "404".to_string(),
    });
    assert!(viewer.state().media_error);
    assert_eq!(viewer.state().resolved_duration_ms, Some(5_000));
    assert_eq!(viewer.snapshot().media, MediaView::Unavailable);

    clock.advance_ms(5_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Advanced(SlidePosition::new(0, 1)));
}

#[test]
fn test_unusable_video_duration_recovers() {
    let clock = ManualClock::new();
    let stories = vec![Story::video("live", "alice", "live.m3u8")];
    let mut viewer = open(&stories, &clock);

    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::MetadataReady {
        handle,
        duration_secs: f64::INFINITY,
    });
    assert!(viewer.state().media_error);
    assert_eq!(viewer.state().resolved_duration_ms, Some(5_000));
}

#[test]
fn test_image_failure_caps_remaining_play() {
    let clock = ManualClock::new();
    let stories = vec![
        Story::image("a1", "alice", "a1.jpg").with_duration_ms(8_000),
        Story::image("a2", "alice", "a2.jpg"),
    ];
    let mut viewer = open(&stories, &clock);

    clock.advance_ms(2_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Progress(0.25));
    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::Failed {
        handle,
        reason: "decode error".to_string(),
    });

    assert!(viewer.state().media_error);
    assert_eq!(viewer.state().resolved_duration_ms, Some(5_000));
    assert_eq!(viewer.state().elapsed_ms, 2_000);
    assert_eq!(viewer.state().progress, 0.4);

    clock.advance_ms(3_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Advanced(SlidePosition::new(0, 1)));
}

#[test]
fn test_long_video_failing_mid_play_advances_within_fallback() {
    let clock = ManualClock::new();
    let stories = vec![
        Story::video("v1", "alice", "v1.mp4"),
        Story::image("a2", "alice", "a2.jpg"),
    ];
    let mut viewer = open(&stories, &clock);

    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::MetadataReady {
        handle,
        duration_secs: 60.0,
    });
    clock.advance_ms(1_000);
    let before = match frame(&mut viewer) {
        FrameOutcome::Progress(progress) => progress,
        other => panic!("expected progress, got {:?}", other),
    };

    viewer.on_media_event(MediaEvent::Failed {
        handle,
        reason: "stream dropped".to_string(),
    });
    assert_eq!(viewer.state().resolved_duration_ms, Some(5_000));
    assert!(viewer.state().progress >= before);
    assert_eq!(viewer.snapshot().media, MediaView::Unavailable);

    clock.advance_ms(5_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Advanced(SlidePosition::new(0, 1)));
}

#[test]
fn test_metadata_while_held_waits_for_release() {
    let clock = ManualClock::new();
    let stories = vec![Story::video("v1", "alice", "v1.mp4")];
    let mut viewer = open(&stories, &clock);

    viewer.handle(Input::PressStart).unwrap();
    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::MetadataReady {
        handle,
        duration_secs: 4.0,
    });
    assert_eq!(viewer.state().resolved_duration_ms, Some(4_000));
    assert!(viewer.schedule_frame().is_none());

    clock.advance_ms(2_000);
    viewer.handle(Input::PressEnd).unwrap();
    assert_eq!(viewer.state().elapsed_ms, 0);

    clock.advance_ms(1_000);
    assert_eq!(frame(&mut viewer), FrameOutcome::Progress(0.25));
}

#[test]
fn test_metadata_while_replying_waits_for_blur() {
    let clock = ManualClock::new();
    let stories = vec![Story::video("v1", "alice", "v1.mp4")];
    let mut viewer = open(&stories, &clock);

    viewer.handle(Input::ReplyFocus).unwrap();
    let handle = viewer.host().last_loaded().unwrap();
    viewer.on_media_event(MediaEvent::MetadataReady {
        handle,
        duration_secs: 2.0,
    });
    clock.advance_ms(3_000);
    assert!(viewer.schedule_frame().is_none());
    assert_eq!(viewer.state().progress, 0.0);

    viewer.handle(Input::ReplyBlur).unwrap();
    clock.advance_ms(500);
    assert_eq!(frame(&mut viewer), FrameOutcome::Progress(0.25));
}

#[test]
fn test_like_toggle_is_isolated_from_playback() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[1]), &clock);

    clock.advance_ms(1_000);
    frame(&mut viewer);
    let before = viewer.state().clone();

    viewer.handle(Input::ToggleLike).unwrap();
    assert!(viewer.likes().contains(&StoryId::new("b0s0")));
    assert!(viewer.snapshot().like_ack_visible);

    viewer.handle(Input::ToggleLike).unwrap();
    assert!(viewer.likes().is_empty());
    assert_eq!(viewer.state(), &before);
}

#[test]
fn test_like_ack_dismisses_itself() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[1]), &clock);

    viewer.handle(Input::ToggleLike).unwrap();
    clock.advance_ms(799);
    assert!(viewer.snapshot().like_ack_visible);
    clock.advance_ms(1);
    frame(&mut viewer);
    assert!(!viewer.snapshot().like_ack_visible);
    assert!(viewer.snapshot().liked);
}

#[test]
fn test_reply_sends_once_and_hands_off() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2]), &clock);

    viewer.handle(Input::ReplyFocus).unwrap();
    assert!(viewer.state().paused);
    viewer.handle(Input::ReplyChanged("nice shot".to_string())).unwrap();
    viewer.handle(Input::Key(Key::Enter)).unwrap();

    let sent = &viewer.messenger().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "nice shot");
    assert_eq!(sent[0].kind, MessageKind::StoryReply);
    assert_eq!(sent[0].recipient.as_str(), "author0");
    assert_eq!(sent[0].referenced_media_url, "https://cdn.example/0/0.jpg");

    assert_eq!(viewer.host().closes, vec![CloseReason::ReplySent]);
    assert_eq!(viewer.host().routes, vec![HostRoute::Messages]);
    assert!(viewer.reply_draft().is_empty());
}

#[test]
fn test_empty_reply_is_a_no_op() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[1]), &clock);

    viewer.handle(Input::ReplyChanged("   ".to_string())).unwrap();
    viewer.handle(Input::SubmitReply).unwrap();

    assert!(viewer.messenger().sent.is_empty());
    assert!(viewer.host().closes.is_empty());
    assert!(viewer.host().routes.is_empty());
    assert!(!viewer.is_closed());
}

#[test]
fn test_failed_reply_keeps_draft_and_viewer() {
    let clock = ManualClock::new();
    let mut viewer = open_with(
        &stories_of(&[1]),
        &clock,
        ViewerConfig::default(),
        RecordingMessenger::failing("offline"),
    );

    viewer.handle(Input::ReplyFocus).unwrap();
    viewer.handle(Input::ReplyChanged("hello".to_string())).unwrap();
    let result = viewer.handle(Input::SubmitReply);

    assert!(matches!(result, Err(ViewerError::Reply(_))));
    assert_eq!(viewer.reply_draft(), "hello");
    assert!(!viewer.is_closed());
    assert!(viewer.host().routes.is_empty());

    // Retry succeeds
    viewer.handle(Input::SubmitReply).unwrap();
    assert_eq!(viewer.messenger().sent.len(), 1);
    assert_eq!(viewer.host().closes, vec![CloseReason::ReplySent]);
}

#[test]
fn test_pause_reasons_combine() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[1]), &clock);

    viewer.handle(Input::PressStart).unwrap();
    viewer.handle(Input::ReplyFocus).unwrap();
    viewer.handle(Input::PressEnd).unwrap();
    assert!(viewer.state().paused, "reply focus still holds the pause");

    viewer.handle(Input::ReplyChanged("draft".to_string())).unwrap();
    viewer.handle(Input::ReplyBlur).unwrap();
    assert!(viewer.state().paused, "unsent draft keeps the slide paused");

    viewer.handle(Input::ReplyFocus).unwrap();
    viewer.handle(Input::ReplyChanged(String::new())).unwrap();
    viewer.handle(Input::ReplyBlur).unwrap();
    assert!(!viewer.state().paused);
}

#[test]
fn test_space_while_typing_does_not_toggle_pause() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[1]), &clock);

    viewer.handle(Input::ReplyFocus).unwrap();
    key(&mut viewer, Key::Space);
    viewer.handle(Input::ReplyBlur).unwrap();
    assert!(!viewer.state().paused);
}

#[test]
fn test_pause_survives_transition() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2]), &clock);

    key(&mut viewer, Key::Space);
    key(&mut viewer, Key::ArrowRight);
    assert!(viewer.state().paused);
    clock.advance_ms(5_000);
    assert!(viewer.schedule_frame().is_none());
    assert_eq!(viewer.state().progress, 0.0);
}

#[test]
fn test_stale_ticket_is_ignored_after_navigation() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[3]), &clock);

    let ticket = viewer.schedule_frame().unwrap();
    key(&mut viewer, Key::ArrowRight);
    clock.advance_ms(4_000);

    assert_eq!(viewer.frame(ticket), FrameOutcome::Stale);
    assert_eq!(viewer.state().progress, 0.0);
    assert_eq!(viewer.position(), SlidePosition::new(0, 1));
}

#[test]
fn test_stale_media_event_is_ignored() {
    let clock = ManualClock::new();
    let stories = vec![
        Story::video("v1", "alice", "v1.mp4"),
        Story::video("v2", "alice", "v2.mp4"),
    ];
    let mut viewer = open(&stories, &clock);

    let first = viewer.host().last_loaded().unwrap();
    key(&mut viewer, Key::ArrowRight);
    viewer.on_media_event(MediaEvent::Failed {
        handle: first,
        reason: "late".to_string(),
    });
    viewer.on_media_event(MediaEvent::MetadataReady {
        handle: first,
        duration_secs: 3.0,
    });

    assert!(!viewer.state().media_error);
    assert_eq!(viewer.state().resolved_duration_ms, None);
}

#[test]
fn test_one_active_media_handle() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2, 2]), &clock);

    for _ in 0..3 {
        key(&mut viewer, Key::ArrowRight);
        assert_eq!(viewer.host().active_media().len(), 1);
    }
    key(&mut viewer, Key::Escape);
    assert!(viewer.host().active_media().is_empty());
    assert_eq!(viewer.host().closes, vec![CloseReason::Dismissed]);

    let loads = viewer
        .host()
        .media
        .iter()
        .filter(|call| matches!(call, MediaCall::Load(..)))
        .count();
    assert_eq!(loads, 4);
}

#[test]
fn test_open_at_story_id() {
    let clock = ManualClock::new();
    let stories = stories_of(&[2, 3]);
    let start = StoryId::new("b1s2");
    let viewer = StoryViewer::open(
        &stories,
        Some(&start),
        ViewerConfig::default(),
        clock.clone(),
        RecordingMessenger::new(),
        RecordingHost::new(),
    )
    .unwrap();

    assert_eq!(viewer.position(), SlidePosition::new(1, 2));
    assert!(viewer.viewed().contains(&start));
}

#[test]
fn test_jump_to_unknown_story_is_ignored() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2, 3]), &clock);

    viewer.jump_to(&StoryId::new("b1s1"));
    assert_eq!(viewer.position(), SlidePosition::new(1, 1));

    viewer.jump_to(&StoryId::new("missing"));
    assert_eq!(viewer.position(), SlidePosition::new(1, 1));
}

#[test]
fn test_open_rejects_empty_collection() {
    let clock = ManualClock::new();
    let result = StoryViewer::open(
        &[],
        None,
        ViewerConfig::default(),
        clock,
        RecordingMessenger::new(),
        RecordingHost::new(),
    );
    assert!(matches!(result, Err(ViewerError::EmptyCollection)));
}

#[test]
fn test_snapshot_segments() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[3]), &clock);

    key(&mut viewer, Key::ArrowRight);
    clock.advance_ms(2_500);
    frame(&mut viewer);

    let snapshot = viewer.snapshot();
    assert_eq!(snapshot.segments, vec![1.0, 0.5, 0.0]);
    assert_eq!(snapshot.slide_count, 3);
    assert_eq!(snapshot.media_type, MediaKind::Image);
    assert_eq!(snapshot.author_id.as_str(), "author0");
    assert!(!snapshot.closed);
}

#[test]
fn test_viewed_stories_are_tracked() {
    let clock = ManualClock::new();
    let mut viewer = open(&stories_of(&[2, 1]), &clock);

    key(&mut viewer, Key::ArrowRight);
    key(&mut viewer, Key::ArrowLeft);
    assert_eq!(viewer.viewed().len(), 2);
}
