//! crates/didactic_core/src/quiz.rs
//!
//! The static quiz: a fixed question list answered strictly in order.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

pub fn question_bank() -> Vec<QuizQuestion> {
    vec![QuizQuestion {
        id: 1,
        text: "What is React?".to_string(),
        options: vec![
            "A JavaScript library".to_string(),
            "A programming language".to_string(),
            "A database".to_string(),
            "An operating system".to_string(),
        ],
        correct_answer: "A JavaScript library".to_string(),
    }]
}

/// One pass through a question list. The score lives only as long as the attempt.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    questions: Vec<QuizQuestion>,
    current: usize,
    score: u32,
}

impl QuizAttempt {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// Answers the current question and advances.
    /// Returns whether the answer was correct, or `None` once the quiz is complete.
    pub fn answer(&mut self, answer: &str) -> Option<bool> {
        let question = self.questions.get(self.current)?;
        let correct = question.correct_answer == answer;
        if correct {
            self.score += 1;
        }
        self.current += 1;
        Some(correct)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}
