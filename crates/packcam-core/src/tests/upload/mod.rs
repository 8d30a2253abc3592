mod credentials;
mod parts;
mod pipeline;
