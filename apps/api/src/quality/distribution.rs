//! Answer-key distribution: initial diagnostic, forced balanced redistribution, final validation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::models::question::{Question, OPTION_COUNT};
use crate::quality::diagnostics::{Diagnostics, DistributionStats};
use crate::quality::PassContext;

/// Shuffles tried before falling back to the greedy interleave.
const MAX_SHUFFLES: usize = 64;
/// Longest allowed run of identical correct indices.
const MAX_RUN: usize = 2;
const LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

/// Length of the longest stretch of equal consecutive values.
pub fn longest_run<T: PartialEq>(values: &[T]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for (i, value) in values.iter().enumerate() {
        if i > 0 && values[i - 1] == *value {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
    }
    longest
}

pub fn distribution_stats(questions: &[Question]) -> DistributionStats {
    let mut counts = [0usize; OPTION_COUNT];
    for q in questions {
        if let Some(slot) = counts.get_mut(q.correct_index()) {
            *slot += 1;
        }
    }
    let indices: Vec<usize> = questions.iter().map(Question::correct_index).collect();
    DistributionStats {
        counts,
        longest_run: longest_run(&indices),
    }
}

fn describe(counts: &[usize; OPTION_COUNT]) -> String {
    LETTERS
        .iter()
        .zip(counts)
        .map(|(letter, count)| format!("{letter}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pass 1: records how the generator distributed the answer key.
pub fn check_initial(
    questions: Vec<Question>,
    _ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let stats = distribution_stats(&questions);
    if !stats.is_balanced() {
        diag.warn(format!(
            "Generated answer distribution is unbalanced ({})",
            describe(&stats.counts)
        ));
    }
    if stats.has_long_run() {
        diag.warn(format!(
            "Generated answer key repeats the same option {} times in a row",
            stats.longest_run
        ));
    }
    debug!("Initial answer distribution: {}", describe(&stats.counts));
    diag.initial_distribution = stats;
    questions
}

/// Expands a count template into a slot order with no run longer than `MAX_RUN`.
///
/// Tries random shuffles first; if none qualifies, builds the order greedily.
pub fn plan_targets<R: Rng + ?Sized>(template: [usize; OPTION_COUNT], rng: &mut R) -> Vec<usize> {
    let mut slots: Vec<usize> = template
        .iter()
        .enumerate()
        .flat_map(|(index, &count)| std::iter::repeat(index).take(count))
        .collect();

    for _ in 0..MAX_SHUFFLES {
        slots.shuffle(rng);
        if longest_run(&slots) <= MAX_RUN {
            return slots;
        }
    }
    interleave(template)
}

/// Greedy fallback: always place the index with most remaining uses that does not
/// extend a run past `MAX_RUN`.
fn interleave(template: [usize; OPTION_COUNT]) -> Vec<usize> {
    let mut remaining = template;
    let total: usize = template.iter().sum();
    let mut order: Vec<usize> = Vec::with_capacity(total);

    while order.len() < total {
        let blocked = match order.as_slice() {
            [.., a, b] if a == b => Some(*b),
            _ => None,
        };
        let next = (0..OPTION_COUNT)
            .filter(|&i| remaining[i] > 0 && Some(i) != blocked)
            .max_by(|&a, &b| remaining[a].cmp(&remaining[b]).then(b.cmp(&a)))
            .or_else(|| (0..OPTION_COUNT).find(|&i| remaining[i] > 0));
        match next {
            Some(i) => {
                remaining[i] -= 1;
                order.push(i);
            }
            None => break,
        }
    }
    order
}

/// Pass 12: forces a 2–3 balanced answer key.
///
/// Picks a template, orders it, then swaps option text so each question's current correct
/// text lands in its target slot. Meaning travels with the text.
pub fn redistribute(
    mut questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let templates = &ctx.rules.distribution_templates;
    if templates.is_empty() {
        diag.error("No distribution templates configured; answer key left as generated");
        return questions;
    }

    let mut rng = StdRng::seed_from_u64(ctx.seed);
    let template = templates[rng.random_range(0..templates.len())];
    if template.iter().sum::<usize>() != questions.len() {
        diag.error(format!(
            "Distribution template {:?} does not cover {} questions",
            template,
            questions.len()
        ));
        return questions;
    }

    let targets = plan_targets(template, &mut rng);
    debug!("Redistributing answer key to {:?}", targets);

    for (q, target) in questions.iter_mut().zip(targets) {
        let current = q.correct_index();
        if current != target {
            q.options.swap(current, target);
            q.correct_answer = target as u8;
            diag.repaired(
                q.id,
                "redistribution",
                format!("correct answer moved {} -> {}", LETTERS[current], LETTERS[target]),
            );
        }
    }
    questions
}

/// Pass 13: recomputes the distribution and records hard failures as errors.
pub fn validate_final(
    questions: Vec<Question>,
    _ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let stats = distribution_stats(&questions);
    if !stats.is_balanced() {
        warn!("Final answer distribution unbalanced: {}", describe(&stats.counts));
        diag.error(format!(
            "Final answer distribution is unbalanced ({})",
            describe(&stats.counts)
        ));
    }
    if stats.has_long_run() {
        diag.error(format!(
            "Final answer key repeats the same option {} times in a row",
            stats.longest_run
        ));
    }
    diag.final_distribution = stats;
    questions
}
