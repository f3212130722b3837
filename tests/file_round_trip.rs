mod support;

use std::{
    thread,
    time::{Duration, Instant},
};

use epoch123::{
    EditorError, EditorSession, ErrorCategory,
    config::{self, EditorSettings},
};
use support::{
    config_home::ConfigHomeGuard,
    playback::ScriptedPlayback,
    wav::{write_int_wav, write_test_wav},
};
use tempfile::tempdir;

fn new_session() -> EditorSession<ScriptedPlayback> {
    EditorSession::new(ScriptedPlayback::default(), EditorSettings::default())
}

fn wait_for_decode(session: &mut EditorSession<ScriptedPlayback>) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if session.poll_decoder().expect("decode succeeds") {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn load_edit_export_and_reload() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.wav");
    let mut samples = vec![0.0f32; 4_410];
    samples[1_000..2_000].fill(0.5);
    write_test_wav(&input, &samples, 44_100, 1);

    let mut session = new_session();
    session.load_file(&input).unwrap();
    let buffer = session.buffer().unwrap();
    assert_eq!(buffer.len(), 4_410);
    assert_eq!(buffer.sample_rate(), 44_100);
    assert_eq!(buffer.source().path.as_deref(), Some(input.as_path()));
    assert!((buffer.duration_seconds() - 0.1).abs() < 1e-9);

    session.set_selection(1_000, 2_000).unwrap();
    session.crop_selected().unwrap();
    let output = dir.path().join("cropped.wav");
    session.export(&output).unwrap();

    let mut reloaded = new_session();
    reloaded.load_file(&output).unwrap();
    let buffer = reloaded.buffer().unwrap();
    assert_eq!(buffer.len(), 1_000);
    assert!(buffer.samples().iter().all(|&s| s == 0.5));
}

#[test]
fn stereo_files_are_downmixed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_test_wav(&path, &[1.0, 0.0, 0.5, -0.5, -1.0, -1.0], 22_050, 2);

    let mut session = new_session();
    session.load_file(&path).unwrap();
    let buffer = session.buffer().unwrap();
    assert_eq!(buffer.samples(), &[0.5, 0.0, -1.0]);
    assert_eq!(buffer.source().channels, 2);
}

#[test]
fn integer_wav_is_scaled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("int.wav");
    write_int_wav(&path, &[0, 16_384, -32_768, 8_192], 8_000);

    let mut session = new_session();
    session.load_file(&path).unwrap();
    assert_eq!(session.buffer().unwrap().samples(), &[0.0, 0.5, -1.0, 0.25]);
}

#[test]
fn failed_load_keeps_previous_buffer() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.wav");
    write_test_wav(&good, &[0.1, 0.2, 0.3], 8_000, 1);
    let bad = dir.path().join("bad.wav");
    std::fs::write(&bad, b"not a wav file at all").unwrap();

    let mut session = new_session();
    session.load_file(&good).unwrap();
    let err = session.load_file(&bad).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Decode);
    assert_eq!(session.buffer().unwrap().len(), 3);

    let missing = session.load_file(&dir.path().join("missing.wav")).unwrap_err();
    assert_eq!(missing.category(), ErrorCategory::Decode);
}

#[test]
fn export_without_audio_is_a_state_error() {
    let dir = tempdir().unwrap();
    let err = new_session()
        .export(&dir.path().join("out.wav"))
        .unwrap_err();
    assert!(matches!(err, EditorError::NoAudioLoaded));
    assert_eq!(err.category(), ErrorCategory::State);
}

#[test]
fn background_decode_installs_latest_request() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");
    write_test_wav(&first, &[0.25; 2_000], 8_000, 1);
    write_test_wav(&second, &[-0.25; 500], 8_000, 1);

    let mut session = new_session();
    assert!(!session.poll_decoder().unwrap());
    let first_id = session.request_load(&first).unwrap();
    let second_id = session.request_load(&second).unwrap();
    assert!(second_id > first_id);

    assert!(wait_for_decode(&mut session));
    let buffer = session.buffer().unwrap();
    assert_eq!(buffer.len(), 500);
    assert_eq!(buffer.source().path.as_deref(), Some(second.as_path()));
    assert!(session.view().is_full());
}

#[test]
fn settings_round_trip_under_config_home() {
    let base = tempdir().unwrap();
    let _guard = ConfigHomeGuard::set(base.path().to_path_buf());

    assert_eq!(config::load_or_default().unwrap(), EditorSettings::default());

    let mut settings = EditorSettings::default();
    settings.playback.volume = 0.3;
    settings.history.limit = 12;
    settings.view.tick_count = 6;
    config::save(&settings).unwrap();

    let path = config::config_path().unwrap();
    assert!(path.starts_with(base.path()));
    assert!(path.is_file());
    assert_eq!(config::load_or_default().unwrap(), settings);
}

#[test]
fn loaded_settings_shape_the_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[selection]\nmin_span_samples = 50\n\n[view]\ntick_count = 4\n",
    )
    .unwrap();
    let settings = config::load_from_path(&path).unwrap();

    let mut session = EditorSession::new(ScriptedPlayback::default(), settings);
    let audio = dir.path().join("audio.wav");
    write_test_wav(&audio, &[0.5; 1_000], 1_000, 1);
    session.load_file(&audio).unwrap();

    assert!(session.set_selection(0, 40).is_none());
    assert!(session.set_selection(0, 60).is_some());
    let ticks = session.time_ticks();
    assert_eq!(ticks.len(), 4);
    assert_eq!(ticks[3].label, "1.00");
}
