mod customers;
mod helpers;
mod mocks;
mod orders;
mod products;
mod stats;
