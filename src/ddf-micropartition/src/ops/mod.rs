mod filter;
mod project;
mod slice;
mod take;
