//! Question pool operations

use super::database::Database;
use super::models::{AnswerKey, Question, QuestionOptions};
use crate::QUESTIONS_KEY;

/// Question set a fresh install starts with
pub(crate) fn built_in_questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            question_text: "Chorrahada tartibga soluvchining qo'li yuqoriga ko'tarilgan bo'lsa, \
                            qaysi transport vositalariga harakatlanish taqiqlanadi?"
                .to_string(),
            options: QuestionOptions {
                a: "Faqat tramvaylarga".to_string(),
                b: "Barcha transport vositalariga va piyodalarga".to_string(),
                c: "Faqat o'ngga burilayotganlarga".to_string(),
                d: "Hech kimga taqiqlanmaydi".to_string(),
            },
            correct_answer: AnswerKey::B,
            image: None,
        },
        Question {
            id: "q2".to_string(),
            question_text:
                "Aholi punktlarida transport vositalarining ruxsat etilgan yuqori tezligi qancha?"
                    .to_string(),
            options: QuestionOptions {
                a: "60 km/soat".to_string(),
                b: "70 km/soat".to_string(),
                c: "50 km/soat".to_string(),
                d: "100 km/soat".to_string(),
            },
            correct_answer: AnswerKey::A,
            image: None,
        },
    ]
}

impl Database {
    /// Get the whole question pool
    pub fn questions(&self) -> Vec<Question> {
        self.store.get(QUESTIONS_KEY, Vec::new())
    }

    /// Insert a question, or replace the one sharing its id
    pub fn save_question(&self, question: &Question) {
        self.store
            .update(QUESTIONS_KEY, Vec::new(), |questions: &mut Vec<Question>| {
                match questions.iter_mut().find(|q| q.id == question.id) {
                    Some(existing) => *existing = question.clone(),
                    None => questions.push(question.clone()),
                }
            });
    }

    /// Remove a question by id; unknown ids are ignored
    pub fn delete_question(&self, id: &str) {
        self.store
            .update(QUESTIONS_KEY, Vec::new(), |questions: &mut Vec<Question>| {
                questions.retain(|q| q.id != id);
            });
    }

    /// Empty the question pool
    pub fn delete_all_questions(&self) {
        self.store.set(QUESTIONS_KEY, &Vec::<Question>::new());
    }
}
