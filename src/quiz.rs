//! Onboarding quiz
//!
//! Walks a visitor through five multiple-choice questions, then maps the
//! answers to a subscription plan and a starting risk profile.

use crate::error::{AppError, Result};
use crate::investor::RiskProfile;
use crate::plans::{BillingPeriod, PlanTier};

pub struct Question {
    pub text: &'static str,
    pub options: [&'static str; 4],
}

pub const QUESTIONS: [Question; 5] = [
    Question {
        text: "What is your level of investing experience?",
        options: [
            "Beginner - I have never invested",
            "Intermediate - I have invested a few times",
            "Advanced - I invest regularly",
            "Expert - I work in the field",
        ],
    },
    Question {
        text: "What is your main investment goal?",
        options: [
            "Keep my money safe",
            "Moderate wealth growth",
            "Maximise long-term returns",
            "Generate monthly passive income",
        ],
    },
    Question {
        text: "How much do you plan to invest each month?",
        options: [
            "Up to R$ 500",
            "R$ 500 - R$ 2.000",
            "R$ 2.000 - R$ 5.000",
            "Over R$ 5.000",
        ],
    },
    Question {
        text: "What is your risk profile?",
        options: [
            "Conservative - I prefer safety",
            "Moderate - I accept some risk",
            "Bold - I seek high returns",
            "Aggressive - I accept high volatility",
        ],
    },
    Question {
        text: "What is your investment horizon?",
        options: [
            "Short term (up to 1 year)",
            "Medium term (1-3 years)",
            "Long term (3-5 years)",
            "Very long term (5+ years)",
        ],
    },
];

const MONTHLY_AMOUNT: usize = 2;
const RISK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Landing,
    Quiz,
    Result,
    Checkout,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    step: QuizStep,
    current: usize,
    answers: Vec<usize>,
    pub billing: BillingPeriod,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            step: QuizStep::Landing,
            current: 0,
            answers: Vec::with_capacity(QUESTIONS.len()),
            billing: BillingPeriod::default(),
        }
    }

    pub fn step(&self) -> QuizStep {
        self.step
    }

    pub fn current_question(&self) -> &'static Question {
        &QUESTIONS[self.current]
    }

    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    pub fn start(&mut self) {
        if self.step == QuizStep::Landing {
            self.step = QuizStep::Quiz;
        }
    }

    /// Record the chosen option for the current question and advance.
    pub fn answer(&mut self, option: usize) -> Result<QuizStep> {
        if self.step != QuizStep::Quiz {
            return Err(AppError::QuizIncomplete);
        }
        if option >= self.current_question().options.len() {
            return Err(AppError::QuizOptionOutOfRange {
                question: self.current,
                option,
            });
        }

        self.answers.push(option);
        if self.current < QUESTIONS.len() - 1 {
            self.current += 1;
        } else {
            self.step = QuizStep::Result;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) {
        if self.step == QuizStep::Quiz && self.current > 0 {
            self.current -= 1;
            self.answers.pop();
        }
    }

    pub fn progress_percent(&self) -> u32 {
        (((self.current + 1) as f64 / QUESTIONS.len() as f64) * 100.0).round() as u32
    }

    pub fn checkout(&mut self) -> Result<PlanTier> {
        if self.step != QuizStep::Result {
            return Err(AppError::QuizIncomplete);
        }
        self.step = QuizStep::Checkout;
        Ok(self.recommended_plan())
    }

    pub fn recommended_plan(&self) -> PlanTier {
        match self.answers.get(MONTHLY_AMOUNT) {
            Some(2) | Some(3) => PlanTier::Premium,
            Some(1) => PlanTier::Pro,
            _ => PlanTier::Basic,
        }
    }

    pub fn suggested_profile(&self) -> Option<RiskProfile> {
        match self.answers.get(RISK)? {
            0 => Some(RiskProfile::Conservative),
            1 => Some(RiskProfile::Moderate),
            _ => Some(RiskProfile::Aggressive),
        }
    }

    /// Run a whole answer sheet through a fresh session.
    pub fn from_answers(answers: &[usize]) -> Result<Self> {
        let mut session = Self::new();
        session.start();
        for &option in answers {
            session.answer(option)?;
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_flow_reaches_checkout() {
        let mut quiz = QuizSession::new();
        assert_eq!(quiz.step(), QuizStep::Landing);
        quiz.start();
        assert_eq!(quiz.progress_percent(), 20);

        for _ in 0..4 {
            assert_eq!(quiz.answer(0).unwrap(), QuizStep::Quiz);
        }
        assert_eq!(quiz.progress_percent(), 100);
        assert_eq!(quiz.answer(1).unwrap(), QuizStep::Result);

        assert_eq!(quiz.checkout().unwrap(), PlanTier::Basic);
        assert_eq!(quiz.step(), QuizStep::Checkout);
    }

    #[test]
    fn test_back_drops_last_answer() {
        let mut quiz = QuizSession::from_answers(&[1, 2]).unwrap();
        assert_eq!(quiz.current_question().text, QUESTIONS[2].text);

        quiz.back();
        assert_eq!(quiz.answers(), &[1]);
        assert_eq!(quiz.current_question().text, QUESTIONS[1].text);

        quiz.back();
        quiz.back();
        assert!(quiz.answers().is_empty());
    }

    #[test]
    fn test_recommended_plan_follows_monthly_amount() {
        assert_eq!(QuizSession::from_answers(&[0, 0, 0, 0, 0]).unwrap().recommended_plan(), PlanTier::Basic);
        assert_eq!(QuizSession::from_answers(&[0, 0, 1, 0, 0]).unwrap().recommended_plan(), PlanTier::Pro);
        assert_eq!(QuizSession::from_answers(&[0, 0, 2, 0, 0]).unwrap().recommended_plan(), PlanTier::Premium);
        assert_eq!(QuizSession::from_answers(&[0, 0, 3, 0, 0]).unwrap().recommended_plan(), PlanTier::Premium);
        assert_eq!(QuizSession::from_answers(&[0]).unwrap().recommended_plan(), PlanTier::Basic);
    }

    #[test]
    fn test_suggested_profile_follows_risk_answer() {
        assert_eq!(QuizSession::from_answers(&[0, 0, 0]).unwrap().suggested_profile(), None);
        assert_eq!(
            QuizSession::from_answers(&[0, 0, 0, 0]).unwrap().suggested_profile(),
            Some(RiskProfile::Conservative)
        );
        assert_eq!(
            QuizSession::from_answers(&[0, 0, 0, 1]).unwrap().suggested_profile(),
            Some(RiskProfile::Moderate)
        );
        assert_eq!(
            QuizSession::from_answers(&[0, 0, 0, 3]).unwrap().suggested_profile(),
            Some(RiskProfile::Aggressive)
        );
    }

    #[test]
    fn test_invalid_transitions() {
        let mut quiz = QuizSession::new();
        assert!(matches!(quiz.answer(0), Err(AppError::QuizIncomplete)));

        quiz.start();
        assert!(matches!(
            quiz.answer(4),
            Err(AppError::QuizOptionOutOfRange { question: 0, option: 4 })
        ));
        assert!(matches!(quiz.checkout(), Err(AppError::QuizIncomplete)));
        assert!(QuizSession::from_answers(&[0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_risk_options_agree_with_text_detection() {
        for (i, option) in QUESTIONS[RISK].options.iter().enumerate() {
            let from_text = RiskProfile::from_text(option);
            let from_index = QuizSession::from_answers(&[0, 0, 0, i]).unwrap().suggested_profile();
            assert_eq!(from_text, from_index, "{}", option);
        }
    }
}
