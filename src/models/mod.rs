pub mod distilbert;

pub use distilbert::{
    Config as DistilBertConfig, DistilBertCheckpoint, DistilBertForSequenceClassification,
    DistilBertModel, SentimentDistilBertModel,
};
