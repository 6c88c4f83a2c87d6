//! Study slot packing.
//!
//! Greedy day-by-day bin packing of study topics: days run from the start
//! date up to (but not including) the deadline, each day is filled with the
//! highest-priority topic first (largest remaining hours breaking ties), and
//! topics split across days when they do not fit. A plan that cannot fit all
//! topics is returned with `feasible = false` and the leftover topics listed
//! instead of being silently truncated.

use chrono::Duration;
use chrono::NaiveDate;

use crate::models::{PlanTopic, StudyPlan, StudyPlanSlot};

/// Tolerance for floating-point hour arithmetic.
const HOURS_EPSILON: f64 = 1e-9;

/// Packs topics into per-day study slots between `start_date` and `deadline`.
///
/// The deadline day itself is excluded; it is the exam day, not a study day.
pub fn pack(
    topics: &[PlanTopic],
    daily_capacity_hours: f64,
    start_date: NaiveDate,
    deadline: NaiveDate,
) -> StudyPlan {
    let days_available = (deadline - start_date).num_days();

    let mut remaining: Vec<(PlanTopic, f64)> = topics
        .iter()
        .filter(|t| t.estimated_hours > HOURS_EPSILON)
        .map(|t| (t.clone(), t.estimated_hours))
        .collect();

    let mut slots: Vec<StudyPlanSlot> = Vec::new();

    if days_available > 0 && daily_capacity_hours > HOURS_EPSILON {
        for day_offset in 0..days_available {
            if remaining.is_empty() {
                break;
            }

            let day = start_date + Duration::days(day_offset);
            let mut capacity_left = daily_capacity_hours;

            while capacity_left > HOURS_EPSILON && !remaining.is_empty() {
                let pick = best_topic_index(&remaining);
                let allocated = remaining[pick].1.min(capacity_left);

                slots.push(StudyPlanSlot {
                    day,
                    topic: remaining[pick].0.name.clone(),
                    allocated_hours: allocated,
                });

                remaining[pick].1 -= allocated;
                capacity_left -= allocated;

                if remaining[pick].1 <= HOURS_EPSILON {
                    remaining.remove(pick);
                }
            }
        }
    }

    let unplaced_topics: Vec<String> = remaining.iter().map(|(t, _)| t.name.clone()).collect();

    StudyPlan {
        feasible: unplaced_topics.is_empty(),
        slots,
        unplaced_topics,
        daily_capacity_hours,
        start_date,
        deadline,
    }
}

/// Picks the next topic: highest priority first, largest remaining hours
/// breaking ties, input order breaking remaining ties.
fn best_topic_index(remaining: &[(PlanTopic, f64)]) -> usize {
    let mut best = 0;
    for (idx, (topic, hours)) in remaining.iter().enumerate().skip(1) {
        let (best_topic, best_hours) = &remaining[best];
        if topic.priority > best_topic.priority
            || (topic.priority == best_topic.priority && *hours > best_hours + HOURS_EPSILON)
        {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn topic(name: &str, priority: u8, hours: f64) -> PlanTopic {
        PlanTopic {
            name: name.to_string(),
            priority,
            estimated_hours: hours,
        }
    }

    #[test]
    fn test_single_topic_splits_across_days() {
        let plan = pack(&[topic("Algebra", 1, 6.0)], 3.0, day(1), day(3));

        assert!(plan.feasible);
        assert_eq!(plan.slots.len(), 2);
        assert_eq!(plan.slots[0], StudyPlanSlot {
            day: day(1),
            topic: "Algebra".to_string(),
            allocated_hours: 3.0,
        });
        assert_eq!(plan.slots[1], StudyPlanSlot {
            day: day(2),
            topic: "Algebra".to_string(),
            allocated_hours: 3.0,
        });
    }

    #[test]
    fn test_daily_capacity_is_never_exceeded() {
        let topics = vec![
            topic("Physics", 2, 4.5),
            topic("History", 1, 3.0),
            topic("Biology", 1, 2.5),
        ];
        let plan = pack(&topics, 4.0, day(1), day(5));

        assert!(plan.feasible);
        for offset in 0..4 {
            let total: f64 = plan
                .slots
                .iter()
                .filter(|s| s.day == day(1 + offset))
                .map(|s| s.allocated_hours)
                .sum();
            assert!(total <= 4.0 + HOURS_EPSILON, "day {} overbooked: {}", offset, total);
        }
    }

    #[test]
    fn test_higher_priority_packs_first() {
        let topics = vec![topic("Casual Reading", 1, 2.0), topic("Final Exam Prep", 3, 2.0)];
        let plan = pack(&topics, 2.0, day(1), day(3));

        assert_eq!(plan.slots[0].topic, "Final Exam Prep");
        assert_eq!(plan.slots[0].day, day(1));
        assert_eq!(plan.slots[1].topic, "Casual Reading");
        assert_eq!(plan.slots[1].day, day(2));
    }

    #[test]
    fn test_largest_remaining_breaks_priority_ties() {
        let topics = vec![topic("Short", 1, 1.0), topic("Long", 1, 5.0)];
        let plan = pack(&topics, 3.0, day(1), day(4));

        assert_eq!(plan.slots[0].topic, "Long");
        assert!(plan.feasible);
    }

    #[test]
    fn test_overcommitted_plan_is_flagged_infeasible() {
        let topics = vec![topic("Calculus", 1, 10.0), topic("Statistics", 1, 10.0)];
        let plan = pack(&topics, 3.0, day(1), day(4)); // 9 hours available, 20 needed

        assert!(!plan.feasible);
        assert!(!plan.unplaced_topics.is_empty());
        for slot in &plan.slots {
            assert!(slot.allocated_hours <= 3.0 + HOURS_EPSILON);
        }
        let placed: f64 = plan.slots.iter().map(|s| s.allocated_hours).sum();
        assert!((placed - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_deadline_on_start_date_yields_infeasible() {
        let plan = pack(&[topic("Anything", 1, 1.0)], 3.0, day(1), day(1));

        assert!(!plan.feasible);
        assert!(plan.slots.is_empty());
        assert_eq!(plan.unplaced_topics, vec!["Anything".to_string()]);
    }

    #[test]
    fn test_zero_capacity_yields_infeasible() {
        let plan = pack(&[topic("Anything", 1, 1.0)], 0.0, day(1), day(5));

        assert!(!plan.feasible);
        assert!(plan.slots.is_empty());
    }

    #[test]
    fn test_zero_hour_topics_are_skipped() {
        let topics = vec![topic("Done Already", 1, 0.0), topic("Remaining", 1, 2.0)];
        let plan = pack(&topics, 2.0, day(1), day(2));

        assert!(plan.feasible);
        assert_eq!(plan.slots.len(), 1);
        assert_eq!(plan.slots[0].topic, "Remaining");
    }

    #[test]
    fn test_slots_are_ordered_by_day() {
        let topics = vec![topic("A", 1, 3.0), topic("B", 1, 3.0)];
        let plan = pack(&topics, 2.0, day(1), day(5));

        let mut last = plan.slots[0].day;
        for slot in &plan.slots[1..] {
            assert!(slot.day >= last);
            last = slot.day;
        }
    }
}
