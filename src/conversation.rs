use serde::Serialize;

use crate::category::Category;
use crate::error::ChatError;
use crate::knowledge::KnowledgeStore;
use crate::model::Classifier;
use crate::response::{render_item, render_list};
use crate::settings::LogicSettings;
use crate::similarity::Similarity;

pub const WELCOME: &str = "Welcome to Bangalore! Known as the 'Garden City' and 'Silicon Valley of India', Bangalore offers a perfect blend of tradition and modernity. The city is famous for its pleasant climate, beautiful parks, historic sites, and vibrant food scene. What specific aspect of Bangalore would you like to know more about?";

pub const FALLBACK: &str = "I'm not sure about that aspect of Bangalore. Would you like to know about popular places, hotels, or restaurants?";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub category: Category,
}

impl ChatReply {
    fn new(response: impl Into<String>, category: Category) -> Self {
        Self {
            response: response.into(),
            category,
        }
    }
}

/// Everything a request needs, built once at startup and only read after.
pub struct TourismContext {
    classifier: Box<dyn Classifier>,
    store: KnowledgeStore,
    similarity: Similarity,
    logic: LogicSettings,
}

impl TourismContext {
    pub fn new(
        classifier: Box<dyn Classifier>,
        store: KnowledgeStore,
        similarity: Similarity,
        logic: LogicSettings,
    ) -> Self {
        Self {
            classifier,
            store,
            similarity,
            logic,
        }
    }

    pub fn similarity(&self) -> &Similarity {
        &self.similarity
    }

    pub fn handle_user_input(&self, message: &str) -> Result<ChatReply, ChatError> {
        let category = self.classifier.classify(message)?;
        log::info!("Predicted category: {}", category);
        Ok(self.answer(category, message))
    }

    fn answer(&self, category: Category, message: &str) -> ChatReply {
        if category.is_general() {
            return ChatReply::new(WELCOME, Category::general());
        }

        if let Some(entry) =
            self.store
                .lookup_qa(message, &self.similarity, self.logic.qa_threshold)
        {
            return ChatReply::new(entry.answer.clone(), category);
        }

        if category.is_catalogued() {
            let items = self.store.filter_by_category(&category);
            let response = match KnowledgeStore::match_by_name(
                &items,
                message,
                &self.similarity,
                self.logic.name_threshold,
            ) {
                Some(item) => render_item(item),
                None => render_list(&items, &category, self.logic.recommendation_limit),
            };
            return ChatReply::new(response, category);
        }

        ChatReply::new(FALLBACK, Category::general())
    }
}
