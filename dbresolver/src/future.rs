/// An owned dynamically typed [`Future`] returned by [`Connection`](crate::connection::Connection)
/// operations, so the capability trait stays object-friendly.
pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;
