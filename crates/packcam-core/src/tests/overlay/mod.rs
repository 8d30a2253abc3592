mod renderer;
