pub mod municode;

use std::{
    fmt::{Debug, Display},
    future::Future,
};

use meeting_datastore::{Meeting, MeetingDetails};

pub use municode::MunicodeSource;

/// A website publishing meeting records.
pub trait MeetingSource {
    type Error: Debug + Display;

    /// Partial records from the site's listing page.
    fn fetch_meetings(&self) -> impl Future<Output = Result<Vec<Meeting>, Self::Error>>;

    fn fetch_details(
        &self,
        meeting_url: &str,
    ) -> impl Future<Output = Result<MeetingDetails, Self::Error>>;

    fn download_document(
        &self,
        document_url: &str,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>>;
}

impl<T: MeetingSource> MeetingSource for &T {
    type Error = T::Error;

    async fn fetch_meetings(&self) -> Result<Vec<Meeting>, Self::Error> {
        (**self).fetch_meetings().await
    }

    async fn fetch_details(&self, meeting_url: &str) -> Result<MeetingDetails, Self::Error> {
        (**self).fetch_details(meeting_url).await
    }

    async fn download_document(&self, document_url: &str) -> Result<Vec<u8>, Self::Error> {
        (**self).download_document(document_url).await
    }
}
