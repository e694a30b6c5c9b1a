mod mocks;
mod orders;
mod products;
