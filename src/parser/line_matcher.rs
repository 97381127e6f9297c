//! Pattern-based line dispatch.
//!
//! A `LineMatcher` holds an ordered list of subscriptions, each a compiled
//! regex tagged with a caller-chosen kind. Every line is tested against
//! every subscription (they are not mutually exclusive) and the outcome is
//! dispatched to a `LineHandler`.
//!
//! Input can arrive three ways, all with identical semantics:
//! - a fully buffered text (`feed_text`)
//! - a `BufRead` source read line by line (`feed_reader`)
//! - arbitrary chunks pushed as they arrive (`push_chunk` + `finish`)

use crate::utils::error::ParseError;
use log::debug;
use regex::{Captures, Regex};
use std::io::BufRead;

/// A single input line and its 0-based position
#[derive(Debug, Clone, Copy)]
pub struct LogLine<'a> {
    pub text: &'a str,
    pub line_number: usize,
}

/// Receiver for matcher dispatches
///
/// **Public** - implemented by the pipeline reconstructor and by tests
pub trait LineHandler<K> {
    /// Called for each subscription whose pattern matched the line
    fn on_match(
        &mut self,
        kind: K,
        captures: &Captures<'_>,
        line: &LogLine<'_>,
    ) -> Result<(), ParseError>;

    /// Called for each subscription registered with a fallback whose pattern did not match
    fn on_no_match(&mut self, _kind: K, _line: &LogLine<'_>) -> Result<(), ParseError> {
        Ok(())
    }

    /// Called once when the input is exhausted
    fn on_end(&mut self) -> Result<(), ParseError>;
}

struct Subscription<K> {
    kind: K,
    pattern: Regex,
    notify_no_match: bool,
}

/// Ordered set of pattern subscriptions plus a line counter
pub struct LineMatcher<K> {
    subscriptions: Vec<Subscription<K>>,
    line_number: usize,
    pending: String,
}

impl<K: Copy> Default for LineMatcher<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> LineMatcher<K> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            line_number: 0,
            pending: String::new(),
        }
    }

    /// Subscribe `kind` to lines matching `pattern`
    ///
    /// **Public** - registration order fixes the dispatch order for a line
    pub fn register(&mut self, kind: K, pattern: &str) -> Result<&mut Self, ParseError> {
        self.subscribe(kind, pattern, false)
    }

    /// Like `register`, but the handler also hears about lines that do not match
    pub fn register_with_fallback(
        &mut self,
        kind: K,
        pattern: &str,
    ) -> Result<&mut Self, ParseError> {
        self.subscribe(kind, pattern, true)
    }

    fn subscribe(
        &mut self,
        kind: K,
        pattern: &str,
        notify_no_match: bool,
    ) -> Result<&mut Self, ParseError> {
        self.subscriptions.push(Subscription {
            kind,
            pattern: Regex::new(pattern)?,
            notify_no_match,
        });
        Ok(self)
    }

    /// Number of lines fed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Test one line against every subscription and dispatch the results
    pub fn feed<H: LineHandler<K>>(&mut self, text: &str, handler: &mut H) -> Result<(), ParseError> {
        let line = LogLine {
            text,
            line_number: self.line_number,
        };

        for subscription in &self.subscriptions {
            match subscription.pattern.captures(text) {
                Some(captures) => handler.on_match(subscription.kind, &captures, &line)?,
                None if subscription.notify_no_match => {
                    handler.on_no_match(subscription.kind, &line)?
                }
                None => {}
            }
        }

        self.line_number += 1;
        Ok(())
    }

    /// Feed a fully buffered text, split on `\r?\n`, then signal the end of input
    ///
    /// A trailing newline does not start another line, as with `feed_reader`.
    pub fn feed_text<H: LineHandler<K>>(&mut self, text: &str, handler: &mut H) -> Result<(), ParseError> {
        if !text.is_empty() {
            let body = text.strip_suffix('\n').unwrap_or(text);
            for line in body.split('\n') {
                self.feed(strip_carriage_return(line), handler)?;
            }
        }
        self.finish(handler)
    }

    /// Feed every line of a reader as it is read, then signal the end of input
    pub fn feed_reader<R: BufRead, H: LineHandler<K>>(
        &mut self,
        reader: R,
        handler: &mut H,
    ) -> Result<(), ParseError> {
        for line in reader.lines() {
            let line = line?;
            self.feed(&line, handler)?;
        }
        self.finish(handler)
    }

    /// Accept an arbitrary chunk of text and feed every line it completes
    ///
    /// A trailing partial line is held back until the next chunk or `finish`.
    pub fn push_chunk<H: LineHandler<K>>(&mut self, chunk: &str, handler: &mut H) -> Result<(), ParseError> {
        self.pending.push_str(chunk);

        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let line = line.strip_suffix('\n').unwrap_or(&line);
            self.feed(strip_carriage_return(line), handler)?;
        }

        Ok(())
    }

    /// Signal the end of input
    ///
    /// Any partial line held back by `push_chunk` is fed first.
    pub fn finish<H: LineHandler<K>>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.feed(strip_carriage_return(&rest), handler)?;
        }

        debug!("End of input after {} lines", self.line_number);
        handler.on_end()
    }
}

fn strip_carriage_return(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Number,
        Word,
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
        ended: usize,
    }

    impl LineHandler<Kind> for Recorder {
        fn on_match(
            &mut self,
            kind: Kind,
            captures: &Captures<'_>,
            line: &LogLine<'_>,
        ) -> Result<(), ParseError> {
            self.seen
                .push(format!("{}:{:?}:{}", line.line_number, kind, &captures[1]));
            Ok(())
        }

        fn on_no_match(&mut self, kind: Kind, line: &LogLine<'_>) -> Result<(), ParseError> {
            self.seen
                .push(format!("{}:no-{:?}:{}", line.line_number, kind, line.text));
            Ok(())
        }

        fn on_end(&mut self) -> Result<(), ParseError> {
            self.ended += 1;
            Ok(())
        }
    }

    fn matcher() -> LineMatcher<Kind> {
        let mut matcher = LineMatcher::new();
        matcher
            .register(Kind::Number, r"(\d+)")
            .unwrap()
            .register_with_fallback(Kind::Word, r"([a-z]+)")
            .unwrap();
        matcher
    }

    #[test]
    fn test_every_pattern_is_tested() {
        let mut recorder = Recorder::default();
        let mut matcher = matcher();

        matcher.feed_text("abc 12\r\n34", &mut recorder).unwrap();

        assert_eq!(
            recorder.seen,
            vec!["0:Number:12", "0:Word:abc", "1:Number:34", "1:no-Word:34"]
        );
        assert_eq!(recorder.ended, 1);
        assert_eq!(matcher.line_number(), 2);
    }

    #[test]
    fn test_chunks_match_buffered_text() {
        let text = "first 1\r\nsecond 2\nthird";

        let mut buffered = Recorder::default();
        matcher().feed_text(text, &mut buffered).unwrap();

        let mut chunked = Recorder::default();
        let mut chunk_matcher = matcher();
        for chunk in ["fir", "st 1\r", "\nsecond 2\nth", "ird"] {
            chunk_matcher.push_chunk(chunk, &mut chunked).unwrap();
        }
        chunk_matcher.finish(&mut chunked).unwrap();

        assert_eq!(buffered.seen, chunked.seen);
        assert_eq!(chunked.ended, 1);
    }

    #[test]
    fn test_reader_matches_buffered_text() {
        let text = "one 1\ntwo 2";

        let mut buffered = Recorder::default();
        matcher().feed_text(text, &mut buffered).unwrap();

        let mut streamed = Recorder::default();
        matcher()
            .feed_reader(std::io::Cursor::new(text), &mut streamed)
            .unwrap();

        assert_eq!(buffered.seen, streamed.seen);
    }

    #[test]
    fn test_trailing_newline_agrees_across_inputs() {
        for text in ["one 1\nword\n", "one 1\r\n\n", "\n", ""] {
            let mut buffered = Recorder::default();
            let mut text_matcher = matcher();
            text_matcher.feed_text(text, &mut buffered).unwrap();

            let mut streamed = Recorder::default();
            let mut reader_matcher = matcher();
            reader_matcher
                .feed_reader(std::io::Cursor::new(text), &mut streamed)
                .unwrap();

            let mut chunked = Recorder::default();
            let mut chunk_matcher = matcher();
            chunk_matcher.push_chunk(text, &mut chunked).unwrap();
            chunk_matcher.finish(&mut chunked).unwrap();

            assert_eq!(buffered.seen, streamed.seen, "{:?}", text);
            assert_eq!(buffered.seen, chunked.seen, "{:?}", text);
            assert_eq!(text_matcher.line_number(), reader_matcher.line_number());
            assert_eq!(text_matcher.line_number(), chunk_matcher.line_number());
        }

        let mut recorder = Recorder::default();
        let mut matcher = matcher();
        matcher.feed_text("one 1\nword\n", &mut recorder).unwrap();
        assert_eq!(matcher.line_number(), 2);
        assert_eq!(
            recorder.seen,
            vec!["0:Number:1", "0:Word:one", "1:Word:word"]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let mut matcher: LineMatcher<Kind> = LineMatcher::new();
        assert!(matcher.register(Kind::Number, r"(unclosed").is_err());
    }
}
