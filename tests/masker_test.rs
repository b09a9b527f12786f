//! Behavioural tests for the masking writer.

use std::io::{self, Write};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use secret_mask::masker::Masker;
use secret_mask::MaskError;

const MASK: &str = "<redacted by secret-mask>";

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    fn contents(&self) -> String {
        String::from_utf8(self.bytes()).unwrap()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct ErrWriter;

impl Write for ErrWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("test"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Write `chunks` through a fresh masker, flush, and return the output.
fn mask_chunks(secrets: &[&str], timeout: Duration, chunks: &[&[u8]]) -> String {
    let masker = Masker::new(secrets.iter().copied(), MASK, timeout).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    for chunk in chunks {
        assert_eq!(writer.write(chunk).unwrap(), chunk.len());
    }
    masker.flush().unwrap();
    masker.close().unwrap();
    sink.contents()
}

fn masked(parts: &[&str]) -> String {
    parts.join("")
}

/// Deterministic bytes with every value represented.
fn pseudo_random_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10);

#[test]
fn output_without_secrets_is_unchanged() {
    let out = mask_chunks(&["foo", "bar"], DEFAULT_TIMEOUT, &[b"test"]);
    assert_eq!(out, "test");
}

#[test]
fn masks_single_secret() {
    let out = mask_chunks(&["foo", "bar"], DEFAULT_TIMEOUT, &[b"test foo test"]);
    assert_eq!(out, masked(&["test ", MASK, " test"]));
}

#[test]
fn masks_multiple_secrets() {
    let out = mask_chunks(&["foo", "bar"], DEFAULT_TIMEOUT, &[b"test foo bar"]);
    assert_eq!(out, masked(&["test ", MASK, " ", MASK]));
}

#[test]
fn incomplete_secret_is_released_on_flush() {
    let out = mask_chunks(&["foobar"], DEFAULT_TIMEOUT, &[b"test foo"]);
    assert_eq!(out, "test foo");
}

#[test]
fn secret_containing_other_secrets_is_masked_once() {
    let out = mask_chunks(
        &["foo", "bar", "testfoobartestfoo"],
        DEFAULT_TIMEOUT,
        &[b"testfoobartestfoo bar foo"],
    );
    assert_eq!(out, masked(&[MASK, " ", MASK, " ", MASK]));
}

#[test]
fn secret_split_across_writes_is_masked() {
    let out = mask_chunks(&["foo", "bar"], DEFAULT_TIMEOUT, &[b"fo", b"o bar f", b"o"]);
    assert_eq!(out, masked(&[MASK, " ", MASK, " fo"]));
}

#[test]
fn pause_within_timeout_still_masks() {
    let masker = Masker::new(["foo", "bar"], MASK, Duration::from_secs(10)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    writer.write_all(b"fo").unwrap();
    thread::sleep(Duration::from_millis(1));
    writer.write_all(b"o test").unwrap();
    masker.close().unwrap();

    assert_eq!(sink.contents(), masked(&[MASK, " test"]));
}

#[test]
fn pause_beyond_timeout_releases_partial_secret() {
    let masker = Masker::new(["foo", "bar"], MASK, Duration::from_micros(1)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    writer.write_all(b"fo").unwrap();
    thread::sleep(Duration::from_secs(2));
    writer.write_all(b"o bar test").unwrap();
    masker.close().unwrap();

    assert_eq!(sink.contents(), masked(&["foo ", MASK, " test"]));
}

#[test]
fn each_write_rearms_the_timer() {
    let masker = Masker::new(["foo"], MASK, Duration::from_millis(500)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    // Longer than the timeout in total, shorter between any two writes.
    writer.write_all(b"f").unwrap();
    thread::sleep(Duration::from_millis(300));
    writer.write_all(b"o").unwrap();
    thread::sleep(Duration::from_millis(300));
    writer.write_all(b"o").unwrap();
    masker.close().unwrap();

    assert_eq!(sink.contents(), MASK);
}

#[test]
fn quiet_writer_times_out_while_another_keeps_writing() {
    let masker = Masker::new(["foo"], MASK, Duration::from_millis(50)).unwrap();
    let quiet = SharedSink::default();
    let busy = SharedSink::default();
    let mut quiet_writer = masker.new_writer(quiet.clone());
    let mut busy_writer = masker.new_writer(busy.clone());
    masker.spawn().unwrap();

    quiet_writer.write_all(b"fo").unwrap();
    let started = Instant::now();
    while started.elapsed() < Duration::from_millis(300) {
        busy_writer.write_all(b"x").unwrap();
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(quiet.contents(), "fo");
    masker.close().unwrap();
}

#[test]
fn writer_timers_are_rearmed_independently() {
    let masker = Masker::new(["foo"], MASK, Duration::from_millis(500)).unwrap();
    let first = SharedSink::default();
    let second = SharedSink::default();
    let mut first_writer = masker.new_writer(first.clone());
    let mut second_writer = masker.new_writer(second.clone());
    masker.spawn().unwrap();

    // The second stream's writes must not extend the first stream's timer,
    // and the first stream's writes keep its own match alive.
    first_writer.write_all(b"f").unwrap();
    second_writer.write_all(b"fo").unwrap();
    thread::sleep(Duration::from_millis(350));
    first_writer.write_all(b"o").unwrap();
    thread::sleep(Duration::from_millis(350));
    first_writer.write_all(b"o").unwrap();

    assert_eq!(second.contents(), "fo");
    masker.close().unwrap();
    assert_eq!(first.contents(), MASK);
}

#[test]
fn zero_timeout_masks_complete_secret_in_one_write() {
    let out = mask_chunks(&["foo", "bar"], Duration::ZERO, &[b"test foo test"]);
    assert_eq!(out, masked(&["test ", MASK, " test"]));
}

#[test]
fn long_input_in_single_byte_writes_passes_through() {
    let input = pseudo_random_bytes(10_000);
    let masker = Masker::new(Vec::<Vec<u8>>::new(), MASK, DEFAULT_TIMEOUT).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    for byte in &input {
        writer.write_all(std::slice::from_ref(byte)).unwrap();
    }
    masker.flush().unwrap();

    assert_eq!(sink.bytes(), input);
    masker.close().unwrap();
}

#[test]
fn reused_input_buffer_does_not_corrupt_output() {
    let input = pseudo_random_bytes(10_000);
    let masker = Masker::new(Vec::<Vec<u8>>::new(), MASK, DEFAULT_TIMEOUT).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    let mut tmp = [0u8; 1];
    for byte in &input {
        tmp[0] = *byte;
        writer.write_all(&tmp).unwrap();
    }
    masker.flush().unwrap();

    assert_eq!(sink.bytes(), input);
    masker.close().unwrap();
}

#[test]
fn long_input_with_secrets_in_small_chunks() {
    let secret = b"s3cr3t-t0k3n";
    let mut input = Vec::new();
    let mut expected = Vec::new();
    for line in 0..200 {
        let text = format!("line {line}: ");
        input.extend_from_slice(text.as_bytes());
        input.extend_from_slice(secret);
        input.push(b'\n');
        expected.extend_from_slice(text.as_bytes());
        expected.extend_from_slice(MASK.as_bytes());
        expected.push(b'\n');
    }

    let masker = Masker::new([secret.to_vec()], MASK, Duration::from_secs(10)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();
    for chunk in input.chunks(5) {
        writer.write_all(chunk).unwrap();
    }
    masker.close().unwrap();

    assert_eq!(sink.bytes(), expected);
}

#[test]
fn flush_returns_before_timeout() {
    let masker = Arc::new(Masker::new(["foo"], MASK, Duration::from_secs(10)).unwrap());
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();
    writer.write_all(b"teststring foo more text").unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let flusher = Arc::clone(&masker);
    thread::spawn(move || {
        let result = flusher.flush();
        let _ = done_tx.send(result.is_ok());
    });

    let flushed = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("masker was not flushed before timeout");
    assert!(flushed);
    assert_eq!(sink.contents(), masked(&["teststring ", MASK, " more text"]));
    masker.close().unwrap();
}

#[test]
fn output_appears_without_flush_once_resolved() {
    let masker = Masker::new(["foo"], MASK, Duration::from_secs(10)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    writer.write_all(b"plain text\n").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while sink.bytes().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(sink.contents(), "plain text\n");
    masker.close().unwrap();
}

#[test]
fn write_error_surfaces_only_through_flush() {
    let masker = Masker::new(["a"], "aa", Duration::from_millis(1)).unwrap();
    let mut writer = masker.new_writer(ErrWriter);
    masker.spawn().unwrap();

    assert_eq!(writer.write(&[0x01]).unwrap(), 1);

    match masker.flush() {
        Err(MaskError::Sink(err)) => assert_eq!(err.to_string(), "test"),
        other => panic!("Expected sink error, got {:?}", other),
    }
    // Writes keep being accepted after the failure.
    assert_eq!(writer.write(b"more").unwrap(), 4);
    assert!(matches!(masker.close(), Err(MaskError::Sink(_))));
}

#[test]
fn run_blocks_on_caller_thread_until_close() {
    let masker = Arc::new(Masker::new(["hunter2"], MASK, Duration::from_secs(10)).unwrap());
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());

    let runner = Arc::clone(&masker);
    let pump = thread::spawn(move || runner.run());

    writer.write_all(b"pass=hunter2").unwrap();
    // Flush only returns once the pump thread owns the queue.
    masker.flush().unwrap();
    masker.close().unwrap();
    pump.join().unwrap().unwrap();

    assert_eq!(sink.contents(), masked(&["pass=", MASK]));
}

#[test]
fn close_without_running_drains_inline() {
    let masker = Masker::new(["hunter2"], "***", Duration::from_secs(10)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());

    writer.write_all(b"pass=hunter2").unwrap();
    masker.close().unwrap();

    assert_eq!(sink.contents(), "pass=***");
    assert_eq!(
        writer.write(b"late").unwrap_err().kind(),
        io::ErrorKind::BrokenPipe
    );
}

#[test]
fn independent_writers_share_one_pump() {
    let masker = Masker::new(["hunter2"], "***", Duration::from_secs(10)).unwrap();
    let out = SharedSink::default();
    let err = SharedSink::default();
    let stdout = masker.new_writer(out.clone());
    let stderr = masker.new_writer(err.clone());
    masker.spawn().unwrap();

    let handles: Vec<_> = [("out hunter2", stdout.clone()), ("err hunter2", stderr.clone())]
        .into_iter()
        .map(|(data, mut writer)| {
            thread::spawn(move || {
                for chunk in data.as_bytes().chunks(3) {
                    writer.write_all(chunk).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    masker.close().unwrap();

    assert_eq!(out.contents(), "out ***");
    assert_eq!(err.contents(), "err ***");
}

#[test]
fn binary_secret_is_masked() {
    let secret = vec![0x00, 0xff, 0x10, 0x80];
    let masker = Masker::new([secret.clone()], "#", Duration::from_secs(10)).unwrap();
    let sink = SharedSink::default();
    let mut writer = masker.new_writer(sink.clone());
    masker.spawn().unwrap();

    writer.write_all(&[0x01, 0x00, 0xff]).unwrap();
    writer.write_all(&[0x10, 0x80, 0x02]).unwrap();
    masker.close().unwrap();

    assert_eq!(sink.bytes(), vec![0x01, b'#', 0x02]);
}
