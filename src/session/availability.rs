use time::OffsetDateTime;

use crate::schemas::quiz::Quiz;
use crate::schemas::result::AttemptedResult;

/// Both window bounds are inclusive: a quiz exactly at `publish_at` or at
/// `visible_until` is live.
pub(crate) fn is_live(quiz: &Quiz, now: OffsetDateTime) -> bool {
    now >= quiz.publish_at && now <= quiz.visible_until
}

/// Eligible = live and never attempted. An attempt blocks re-offering even
/// while the window is still open; there is no partial-attempt resumption.
pub(crate) fn is_eligible(quiz: &Quiz, attempted: &[AttemptedResult], now: OffsetDateTime) -> bool {
    is_live(quiz, now) && !attempted.iter().any(|result| result.quiz_id == quiz.id)
}

pub(crate) fn eligible_quizzes<'a>(
    quizzes: &'a [Quiz],
    attempted: &[AttemptedResult],
    now: OffsetDateTime,
) -> Vec<&'a Quiz> {
    quizzes.iter().filter(|quiz| is_eligible(quiz, attempted, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn quiz(id: i64) -> Quiz {
        Quiz {
            id,
            title: format!("Quiz {id}"),
            publish_at: datetime!(2026-03-01 10:00 UTC),
            visible_until: datetime!(2026-03-01 12:00 UTC),
        }
    }

    fn attempt(quiz_id: i64) -> AttemptedResult {
        AttemptedResult {
            quiz_id,
            title: format!("Quiz {quiz_id}"),
            score: 3,
            total: 4,
            submitted_at: Some(datetime!(2026-03-01 11:00 UTC)),
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let quiz = quiz(1);
        assert!(is_live(&quiz, quiz.publish_at));
        assert!(is_live(&quiz, quiz.visible_until));
    }

    #[test]
    fn outside_window_is_not_live() {
        let quiz = quiz(1);
        assert!(!is_live(&quiz, quiz.publish_at - Duration::seconds(1)));
        assert!(!is_live(&quiz, quiz.visible_until + Duration::seconds(1)));
    }

    #[test]
    fn attempted_quiz_is_never_re_offered() {
        let quiz = quiz(1);
        let now = datetime!(2026-03-01 11:00 UTC);
        assert!(is_eligible(&quiz, &[], now));
        assert!(!is_eligible(&quiz, &[attempt(1)], now));
        assert!(is_eligible(&quiz, &[attempt(2)], now));
    }

    #[test]
    fn filter_keeps_only_eligible() {
        let quizzes = vec![quiz(1), quiz(2), quiz(3)];
        let now = datetime!(2026-03-01 11:00 UTC);
        let eligible = eligible_quizzes(&quizzes, &[attempt(2)], now);
        let ids: Vec<i64> = eligible.iter().map(|quiz| quiz.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn filter_is_empty_outside_window() {
        let quizzes = vec![quiz(1)];
        let now = datetime!(2026-03-02 11:00 UTC);
        assert!(eligible_quizzes(&quizzes, &[], now).is_empty());
    }
}
