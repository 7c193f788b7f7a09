//! Tokenize the input.
//!
//! Source programs are whitespace delimited words. A `;` starts a comment
//! that runs until the end of the line.

use std::str;

use crate::span::Span;

/// An iterator over input tokens.
#[derive(Debug, Clone)]
pub struct Tokens<'i> {
    /// The original input.
    input: &'i str,
    /// The input as (index, char) values.
    iter: str::CharIndices<'i>,
}

fn is_word(c: &char) -> bool {
    !c.is_whitespace() && *c != ';'
}

impl<'i> Tokens<'i> {
    /// Construct a new iterator over the input tokens.
    pub fn new(input: &'i str) -> Self {
        let iter = input.char_indices();
        Self { input, iter }
    }

    /// Returns the next index of the iterator.
    fn peek_index(&self) -> usize {
        self.iter
            .clone()
            .next()
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.input.len())
    }

    /// Eats the next character if the predicate is satisfied.
    fn lex_if<P>(&mut self, predicate: P) -> bool
    where
        P: Fn(&char) -> bool,
    {
        match self.iter.clone().next() {
            Some((_, c)) if predicate(&c) => self.iter.next().is_some(),
            _ => false,
        }
    }

    /// Eats all characters satisfying the predicate.
    fn lex_while<P>(&mut self, predicate: P)
    where
        P: Fn(&char) -> bool + Copy,
    {
        while self.lex_if(predicate) {}
    }
}

impl<'i> Iterator for Tokens<'i> {
    type Item = (Span, &'i str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.iter.next()? {
                (_, c) if c.is_whitespace() => continue,
                (_, ';') => self.lex_while(|&c| c != '\n'),
                (i, _) => {
                    self.lex_while(is_word);
                    let span = Span::new(i, self.peek_index());
                    break Some((span, span.as_str(self.input)));
                }
            }
        }
    }
}
