//! Built-in puzzle templates and the filter that keeps weekly batches fresh.

use std::collections::HashSet;

use crate::puzzles::types::Difficulty::{Easy, Hard, Medium, SuperHard};
use crate::puzzles::types::{Difficulty, Puzzle, PuzzleTemplate};

const fn template(
    question: &'static str,
    answer: &'static str,
    difficulty: Difficulty,
    category: &'static str,
) -> PuzzleTemplate {
    PuzzleTemplate {
        question,
        answer,
        difficulty,
        category,
    }
}

pub static TEMPLATES: &[PuzzleTemplate] = &[
    // easy
    template("What has keys but can't open locks?", "piano", Easy, "riddles"),
    template("What has hands but can't clap?", "clock", Easy, "riddles"),
    template("What gets wetter the more it dries?", "towel", Easy, "riddles"),
    template("What has a neck but no head?", "bottle", Easy, "riddles"),
    template("What goes up but never comes down?", "age", Easy, "riddles"),
    template("What is 15 + 27?", "42", Easy, "math"),
    template("What is 9 multiplied by 8?", "72", Easy, "math"),
    template("What has one eye but can't see?", "needle", Easy, "wordplay"),
    template("What is the opposite of 'offline'?", "online", Easy, "tech"),
    template("Which key on a keyboard is usually the longest?", "space", Easy, "tech"),
    template("If you have 3 apples and take away 2, how many apples do you have?", "2", Easy, "logic"),
    template("What month has 28 days?", "all of them", Easy, "logic"),
    // medium
    template("I speak without a mouth and hear without ears. I have no body, but I come alive with wind. What am I?", "echo", Medium, "riddles"),
    template("The more of this there is, the less you see. What is it?", "darkness", Medium, "riddles"),
    template("What can travel around the world while staying in a corner?", "stamp", Medium, "riddles"),
    template("What begins with T, ends with T, and has T in it?", "teapot", Medium, "wordplay"),
    template("What five-letter word becomes shorter when you add two letters to it?", "short", Medium, "wordplay"),
    template("What is the next number in the sequence 2, 4, 8, 16, ...?", "32", Medium, "math"),
    template("What is 12 squared?", "144", Medium, "math"),
    template("What is the binary representation of the decimal number 10?", "1010", Medium, "tech"),
    template("What does the 'C' in CPU stand for?", "central", Medium, "tech"),
    template("A farmer has 17 sheep and all but 9 run away. How many are left?", "9", Medium, "logic"),
    template("Which weighs more: a kilogram of feathers or a kilogram of steel?", "neither", Medium, "logic"),
    template("What has cities but no houses, forests but no trees, and water but no fish?", "map", Medium, "riddles"),
    // hard
    template("What comes once in a minute, twice in a moment, but never in a thousand years?", "m", Hard, "wordplay"),
    template("Forward I am heavy, backward I am not. What am I?", "ton", Hard, "wordplay"),
    template("What is the smallest prime number greater than 50?", "53", Hard, "math"),
    template("What is the sum of all integers from 1 to 100?", "5050", Hard, "math"),
    template("What is the hexadecimal value of the decimal number 255?", "ff", Hard, "tech"),
    template("Which HTTP status code means 'Not Found'?", "404", Hard, "tech"),
    template("A bat and a ball cost $1.10 in total. The bat costs $1.00 more than the ball. How many cents does the ball cost?", "5", Hard, "logic"),
    template("If two's company and three's a crowd, what are four and five?", "9", Hard, "logic"),
    template("What can you catch but not throw?", "cold", Hard, "riddles"),
    // super hard
    template("What is the only number whose English name has its letters in alphabetical order?", "forty", SuperHard, "wordplay"),
    template("How many times can you subtract 10 from 100?", "once", SuperHard, "logic"),
    template("What is the 10th number in the Fibonacci sequence starting 1, 1, 2, 3, ...?", "55", SuperHard, "math"),
    template("What is 2 raised to the power of 16?", "65536", SuperHard, "math"),
    template("In Big-O notation, what is the average time complexity of binary search? Answer in the form o(...)", "o(log n)", SuperHard, "tech"),
    template("What data structure operates on a last-in, first-out basis?", "stack", SuperHard, "tech"),
    template("The person who makes it sells it, the person who buys it never uses it, and the person who uses it never knows. What is it?", "coffin", SuperHard, "riddles"),
];

/// Case- and whitespace-insensitive de-duplication key of a question.
pub fn question_key(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Templates from `templates` whose question does not already appear among
/// `existing_questions`. Pure; an empty result means the catalog is exhausted.
pub fn filter_unused<'a, I>(templates: &[PuzzleTemplate], existing_questions: I) -> Vec<PuzzleTemplate>
where
    I: IntoIterator<Item = &'a str>,
{
    let used: HashSet<String> = existing_questions.into_iter().map(question_key).collect();
    templates
        .iter()
        .filter(|t| !used.contains(&question_key(t.question)))
        .copied()
        .collect()
}

/// Built-in templates not yet used by any known puzzle, active or not.
pub fn available_templates(existing: &[Puzzle]) -> Vec<PuzzleTemplate> {
    filter_unused(TEMPLATES, existing.iter().map(|p| p.question.as_str()))
}
